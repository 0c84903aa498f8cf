//! Plane (Givens) rotations.
//!
//! §4.1 of the specification. The teacher represents rotations the same
//! way — a plain value type plus free functions/methods that mutate a
//! matrix slice in place (`GivensRotation::cancel_y`, `.rotate_rows(..)`,
//! `GivensRotation::new_unchecked(c, s)`, `.inverse()` in
//! `linalg/symmetric_eigen.rs`). This module reproduces that shape for the
//! `OMatrix`/`ComplexScalar` pair used by the rest of this crate.

use crate::base::OMatrix;
use crate::scalar::ComplexScalar;

/// A 2x2 rotation `G = [[c, s], [-conj(s), c]]` with `c` real and
/// `c^2 + |s|^2 = 1`, such that `G * (f, g)^T = (r, 0)^T`.
#[derive(Clone, Copy, Debug)]
pub struct GivensRotation<N: ComplexScalar> {
    c: N::Real,
    s: N,
}

impl<N: ComplexScalar> GivensRotation<N> {
    #[inline]
    pub fn c(&self) -> N::Real {
        self.c
    }

    #[inline]
    pub fn s(&self) -> N {
        self.s
    }

    #[inline]
    pub fn new_unchecked(c: N::Real, s: N) -> Self {
        GivensRotation { c, s }
    }

    /// `G^H`, itself a valid rotation (`GivensRotation::new_unchecked(c, -s)`).
    #[inline]
    pub fn inverse(&self) -> Self {
        GivensRotation {
            c: self.c,
            s: -self.s,
        }
    }

    /// Builds the rotation that zeros `g` given the column `(f, g)`, using
    /// the usual stable formula: scale by `max(|f|, |g|)` before forming the
    /// hypotenuse so that neither intermediate over- nor underflows.
    /// Returns `(rotation, r)` with `r` the surviving entry.
    pub fn new(f: N, g: N) -> (Self, N) {
        if g.is_zero_scalar() {
            return (
                GivensRotation {
                    c: N::Real::one(),
                    s: N::zero(),
                },
                f,
            );
        }
        if f.is_zero_scalar() {
            let g_mod = g.modulus();
            let s = g.conjugate().scale(N::Real::one() / g_mod);
            return (
                GivensRotation {
                    c: N::Real::zero(),
                    s,
                },
                N::from_real(g_mod),
            );
        }

        let f_mod = f.modulus();
        let g_mod = g.modulus();
        let scale = if f_mod > g_mod { f_mod } else { g_mod };
        let inv_scale = N::Real::one() / scale;
        let fs = f.scale(inv_scale);
        let gs = g.scale(inv_scale);
        let fs_mod = fs.modulus();
        let gs_mod = gs.modulus();
        let d = (fs_mod * fs_mod + gs_mod * gs_mod).sqrt();
        let sign_f = fs.scale(N::Real::one() / fs_mod);

        let c = fs_mod / d;
        let s = sign_f * gs.conjugate().scale(N::Real::one() / d);
        let r = sign_f.scale(d * scale);

        (GivensRotation { c, s }, r)
    }

    /// Applies `G` from the left to rows `(i, i+1)`, columns `[c0, c1)`.
    /// Touches only those two rows.
    pub fn rotate_rows(&self, m: &mut OMatrix<N>, i: usize, c0: usize, c1: usize) {
        for j in c0..c1 {
            let f = m.get(i, j);
            let g = m.get(i + 1, j);
            m.set(i, j, f.scale(self.c) + self.s * g);
            m.set(i + 1, j, g.scale(self.c) - self.s.conjugate() * f);
        }
    }

    /// Applies `G^H` from the right to columns `(j, j+1)`, rows `[r0, r1)`.
    /// Touches only those two columns.
    pub fn rotate_columns(&self, m: &mut OMatrix<N>, j: usize, r0: usize, r1: usize) {
        for i in r0..r1 {
            let f = m.get(i, j);
            let g = m.get(i, j + 1);
            m.set(i, j, f.scale(self.c) + g * self.s.conjugate());
            m.set(i, j + 1, g.scale(self.c) - self.s * f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn real_rotation_zeros_second_entry() {
        let (rot, r) = GivensRotation::<f64>::new(3.0, 4.0);
        assert!((rot.c() * rot.c() + rot.s() * rot.s() - 1.0).abs() < 1e-14);
        let new_f = r;
        let new_g = -rot.s() * 3.0 + rot.c() * 4.0;
        assert!((new_f - 5.0).abs() < 1e-12);
        assert!(new_g.abs() < 1e-12);
    }

    #[test]
    fn complex_rotation_preserves_unitarity() {
        let f = Complex::new(1.0, 2.0);
        let g = Complex::new(-0.5, 3.0);
        let (rot, _r) = GivensRotation::<Complex<f64>>::new(f, g);
        let norm = rot.c() * rot.c() + (rot.s() * rot.s().conj()).re;
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_rows_only_touches_the_two_rows() {
        let mut m = OMatrix::<f64>::from_row_slice(3, 3, &[1.0; 9]);
        let (rot, _) = GivensRotation::<f64>::new(1.0, 1.0);
        rot.rotate_rows(&mut m, 0, 0, 3);
        for j in 0..3 {
            assert_eq!(m.get(2, j), 1.0);
        }
    }

    #[test]
    fn zero_second_entry_yields_identity_rotation() {
        let (rot, r) = GivensRotation::<f64>::new(5.0, 0.0);
        assert_eq!(rot.c(), 1.0);
        assert_eq!(rot.s(), 0.0);
        assert_eq!(r, 5.0);
    }
}
