//! Right-eigenvector back-substitution on a triangular Schur factor (§4.4 / §6).
//!
//! Given an upper-triangular `T` (the output of [`crate::complex_schur`], or
//! a real quasi-triangular `T` promoted to complex per-block by the caller),
//! solves `T v = lambda v` for each diagonal eigenvalue by back substitution,
//! column by column, perturbing the diagonal away from exact singularity the
//! way `GivensRotation::new`'s zero-pivot branch perturbs away from zero
//! rather than dividing by it. When `z` is supplied, rotates each solved
//! vector back into the original (pre-Hessenberg, pre-triangularization)
//! basis via `Z`, mirroring how [`crate::hessenberg::hessenberg`] and the two
//! QR drivers already thread `Z` through every rotation they apply.

use crate::base::OMatrix;
use crate::scalar::{ComplexScalar, RealScalar};

#[inline]
fn max_r<R: RealScalar>(a: R, b: R) -> R {
    if a > b {
        a
    } else {
        b
    }
}

/// Computes the right eigenvectors of `t` (upper triangular), one per
/// column, in the basis `t` is expressed in. If `z` is given, each
/// eigenvector is additionally rotated by `z` into the basis `z` maps to
/// (typically the original input matrix's basis).
pub fn right_eigenvectors<N: ComplexScalar>(t: &OMatrix<N>, z: Option<&OMatrix<N>>) -> OMatrix<N> {
    let n = t.nrows();
    let eps = N::Real::epsilon();
    let small = N::Real::safe_min();
    let bignum = N::Real::one() / small;
    // smin's floor is mu_R * n / eps_R (SPEC_FULL.md §4.4 step 1), not bare
    // safe_min.
    let smin_floor = small * N::Real::from_usize(n) / eps;

    // tnorms[j] = sum_{i<j} |T[i,j]| (SPEC_FULL.md §4.4 step 4), a column
    // L1-ish norm used as the overflow-bound workspace, not a column max.
    let mut colnorm = vec![N::Real::zero(); n];
    for j in 0..n {
        let mut total = N::Real::zero();
        for i in 0..j {
            total += t.get(i, j).norm1();
        }
        colnorm[j] = total;
    }

    let mut out = OMatrix::<N>::zeros(n, n);

    for k in 0..n {
        let lambda = t.get(k, k);
        let smin = max_r(eps * lambda.norm1(), smin_floor);
        let bound = bignum / max_r(colnorm[k], N::Real::one());

        let mut v = vec![N::zero(); k + 1];
        v[k] = N::one();
        let mut vmax = N::Real::one();

        for i in (0..k).rev() {
            let mut sum = N::zero();
            for j in (i + 1)..=k {
                sum = sum + t.get(i, j) * v[j];
            }

            let mut d = t.get(i, i) - lambda;
            if d.norm1() < smin {
                d = N::from_real(smin);
            }

            let sum_mod = sum.modulus();
            let d_mod = d.modulus();
            if d_mod < N::Real::one() && sum_mod > d_mod * bound {
                let scale = N::Real::one() / max_r(sum_mod, N::Real::one());
                for e in v.iter_mut() {
                    *e = e.scale(scale);
                }
                sum = sum.scale(scale);
                vmax = vmax * scale;
            }

            v[i] = -(sum / d);
            vmax = max_r(vmax, v[i].norm1());
            if vmax > RealScalar::sqrt(bignum) {
                let scale = N::Real::one() / vmax;
                for e in v.iter_mut() {
                    *e = e.scale(scale);
                }
                vmax = N::Real::one();
            }
        }

        // Normalize to unit infinity-norm before (optionally) changing basis.
        normalize_max(&mut v);

        if let Some(z) = z {
            let mut col = vec![N::zero(); n];
            for r in 0..n {
                let mut acc = N::zero();
                for i in 0..=k {
                    acc = acc + z.get(r, i) * v[i];
                }
                col[r] = acc;
            }
            normalize_max(&mut col);
            for r in 0..n {
                out.set(r, k, col[r]);
            }
        } else {
            for i in 0..n {
                out.set(i, k, if i <= k { v[i] } else { N::zero() });
            }
        }
    }

    out
}

fn normalize_max<N: ComplexScalar>(v: &mut [N]) {
    let mut norm = N::Real::zero();
    for &e in v.iter() {
        norm = max_r(norm, e.norm1());
    }
    if norm == N::Real::zero() {
        return;
    }
    let inv = N::Real::one() / norm;
    for e in v.iter_mut() {
        *e = e.scale(inv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex;

    #[test]
    fn diagonal_matrix_has_standard_basis_eigenvectors() {
        let t = OMatrix::from_row_slice(
            2,
            2,
            &[Complex::new(2.0, 0.0), Complex::new(0.0, 0.0), Complex::new(0.0, 0.0), Complex::new(3.0, 0.0)],
        );
        let v = right_eigenvectors(&t, None);
        assert_relative_eq!(v.get(0, 0).re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.get(1, 0).re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.get(1, 1).re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn solved_vector_actually_satisfies_tv_eq_lambda_v() {
        let t = OMatrix::from_row_slice(
            3,
            3,
            &[
                Complex::new(1.0, 0.0), Complex::new(2.0, 0.0), Complex::new(3.0, 0.0),
                Complex::new(0.0, 0.0), Complex::new(4.0, 0.0), Complex::new(5.0, 0.0),
                Complex::new(0.0, 0.0), Complex::new(0.0, 0.0), Complex::new(6.0, 0.0),
            ],
        );
        let v = right_eigenvectors(&t, None);
        for k in 0..3 {
            let lambda = t.get(k, k);
            for r in 0..3 {
                let mut tv = Complex::new(0.0, 0.0);
                for c in 0..3 {
                    tv += t.get(r, c) * v.get(c, k);
                }
                let expected = lambda * v.get(r, k);
                assert_relative_eq!(tv.re, expected.re, epsilon = 1e-8);
                assert_relative_eq!(tv.im, expected.im, epsilon = 1e-8);
            }
        }
    }
}
