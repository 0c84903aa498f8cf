//! A minimal owned dense matrix type.
//!
//! The teacher (`nalgebra`) builds its matrices on a generic-dimension,
//! generic-storage system (`Matrix<N, R, C, S>`, `DefaultAllocator`,
//! `MatrixN`/`VectorN`) so that the same algorithm can run over statically
//! *or* dynamically sized matrices. The QR engine here only ever operates on
//! runtime-sized windows (`istart..iend`) of a single dynamically sized
//! matrix, so the type-level dimension machinery buys nothing; `OMatrix<N>`
//! plays the role of `nalgebra::DMatrix<N>` with row-major storage and plain
//! `usize` indices instead.

use num_traits::{One, Zero};
use std::ops::{Index, IndexMut};

/// An owned, row-major, dynamically sized dense matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct OMatrix<N> {
    data: Vec<N>,
    nrows: usize,
    ncols: usize,
}

impl<N: Copy> OMatrix<N> {
    pub fn from_element(nrows: usize, ncols: usize, value: N) -> Self {
        OMatrix {
            data: vec![value; nrows * ncols],
            nrows,
            ncols,
        }
    }

    pub fn from_row_slice(nrows: usize, ncols: usize, data: &[N]) -> Self {
        assert_eq!(data.len(), nrows * ncols, "row slice has the wrong length");
        OMatrix {
            data: data.to_vec(),
            nrows,
            ncols,
        }
    }

    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> N) -> Self
    where
        N: Zero,
    {
        let mut data = Vec::with_capacity(nrows * ncols);
        for r in 0..nrows {
            for c in 0..ncols {
                data.push(f(r, c));
            }
        }
        OMatrix { data, nrows, ncols }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> N {
        self.data[r * self.ncols + c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, v: N) {
        self.data[r * self.ncols + c] = v;
    }

    /// A contiguous slice of row `r`, columns `[c0, c1)`.
    #[inline]
    pub fn row_slice(&self, r: usize, c0: usize, c1: usize) -> &[N] {
        let base = r * self.ncols;
        &self.data[base + c0..base + c1]
    }

    #[inline]
    pub fn row_slice_mut(&mut self, r: usize, c0: usize, c1: usize) -> &mut [N] {
        let base = r * self.ncols;
        &mut self.data[base + c0..base + c1]
    }

    pub fn column(&self, c: usize) -> Vec<N> {
        (0..self.nrows).map(|r| self.get(r, c)).collect()
    }

    pub fn set_column(&mut self, c: usize, values: &[N]) {
        assert_eq!(values.len(), self.nrows);
        for (r, &v) in values.iter().enumerate() {
            self.set(r, c, v);
        }
    }

    pub fn transpose(&self) -> Self {
        OMatrix::from_fn(self.ncols, self.nrows, |r, c| self.get(c, r))
    }
}

impl<N: Copy + Zero> OMatrix<N> {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::from_element(nrows, ncols, N::zero())
    }
}

impl<N: Copy + Zero + One> OMatrix<N> {
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |r, c| if r == c { N::one() } else { N::zero() })
    }
}

impl<N: Copy> Index<(usize, usize)> for OMatrix<N> {
    type Output = N;
    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &N {
        &self.data[r * self.ncols + c]
    }
}

impl<N: Copy> IndexMut<(usize, usize)> for OMatrix<N> {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut N {
        &mut self.data[r * self.ncols + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_diagonal_ones() {
        let id: OMatrix<f64> = OMatrix::identity(3);
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_eq!(id.get(r, c), expected);
            }
        }
    }

    #[test]
    fn transpose_swaps_indices() {
        let m = OMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = m.transpose();
        assert_eq!(t.nrows(), 3);
        assert_eq!(t.ncols(), 2);
        assert_eq!(t.get(2, 1), 6.0);
    }
}
