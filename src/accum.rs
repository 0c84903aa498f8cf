//! The `Z = nothing` sentinel (§9, Design Notes).
//!
//! The teacher's `SymmetricEigen::do_decompose` uses a plain `Option<MatrixN<..>>`
//! for exactly this purpose (`q: Option<MatrixN<N, D>>`, checked at every
//! rotation site with `if let Some(ref mut q) = q`). `Accum` reproduces that
//! idiom as a named enum so call sites read as "accumulate into Z" rather
//! than an anonymous `Option`.

use crate::base::OMatrix;
use crate::scalar::ComplexScalar;

/// Whether the driver should accumulate rotations into a Schur-vector
/// matrix, and if so, which one.
pub enum Accum<'a, N: ComplexScalar> {
    /// Eigenvalues-only mode: skip all right-multiplications onto Z.
    None,
    /// Accumulate into the given matrix, which the caller owns.
    Some(&'a mut OMatrix<N>),
}

impl<'a, N: ComplexScalar> Accum<'a, N> {
    #[inline]
    pub fn is_some(&self) -> bool {
        matches!(self, Accum::Some(_))
    }

    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut OMatrix<N>> {
        match self {
            Accum::None => None,
            Accum::Some(z) => Some(z),
        }
    }
}
