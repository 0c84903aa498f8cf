//! Hessenberg reduction (collaborator, §4.5 / §6).
//!
//! The distilled specification treats this as an external, pre-existing
//! collaborator and only sketches its interface. To keep `schur`/`eigvals`
//! usable end to end without pulling in an external LAPACK binding, this
//! crate carries a small in-tree reducer — but keeps it deliberately
//! separate from, and thinner than, the QR engine itself.
//!
//! Rather than introducing a second numerical primitive (Householder
//! reflectors), this reduces a general matrix to upper Hessenberg form using
//! the same [`GivensRotation`] building block the QR engine already uses: for
//! each column, the subdiagonal entries are eliminated one at a time, from
//! the bottom of the column upward, by a rotation of the two rows involved.
//! This is the Givens-rotation analogue of the textbook Householder
//! reduction and is exactly the kind of generalization the rotation
//! primitives in §4.1 are meant to support.

use crate::base::OMatrix;
use crate::givens::GivensRotation;
use crate::scalar::ComplexScalar;

/// Reduces `a` to upper Hessenberg form in place, returning the accumulated
/// orthogonal/unitary factor `Q` (such that `a_original = Q * H * Q^H`) when
/// `want_q` is set.
pub fn hessenberg<N: ComplexScalar>(mut a: OMatrix<N>, want_q: bool) -> (OMatrix<N>, Option<OMatrix<N>>) {
    let n = a.nrows();
    let mut q = if want_q {
        Some(OMatrix::<N>::identity(n))
    } else {
        None
    };

    if n < 3 {
        return (a, q);
    }

    for k in 0..n - 2 {
        for i in (k + 2..n).rev() {
            let pivot = a.get(i - 1, k);
            let target = a.get(i, k);
            if target.is_zero_scalar() {
                continue;
            }
            let (rot, r) = GivensRotation::new(pivot, target);
            rot.rotate_rows(&mut a, i - 1, k, n);
            a.set(i - 1, k, r);
            a.set(i, k, N::zero());

            // Right-apply G^H over every row to preserve similarity: the
            // left rotation above implements A -> G A; mirroring it onto
            // the right (A -> A G^H) and onto Q keeps A = Q H Q^H invariant.
            rot.rotate_columns(&mut a, i - 1, 0, n);
            if let Some(q) = &mut q {
                rot.rotate_columns(q, i - 1, 0, n);
            }
        }
    }

    (a, q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matmul(a: &OMatrix<f64>, b: &OMatrix<f64>) -> OMatrix<f64> {
        let n = a.nrows();
        let m = b.ncols();
        let k = a.ncols();
        OMatrix::from_fn(n, m, |r, c| {
            (0..k).map(|t| a.get(r, t) * b.get(t, c)).sum()
        })
    }

    #[test]
    fn reduces_to_hessenberg_shape_and_preserves_similarity() {
        let a = OMatrix::from_row_slice(
            4,
            4,
            &[
                5.0, 4.0, 3.0, 2.0, 1.0, 4.0, 0.0, 3.0, 2.0, 0.0, 3.0, 0.0, 3.0, 2.0, 1.0, 2.0,
            ],
        );
        let (h, q) = hessenberg(a.clone(), true);
        let q = q.unwrap();

        for r in 0..4 {
            for c in 0..4 {
                if r > c + 1 {
                    assert_relative_eq!(h.get(r, c), 0.0, epsilon = 1e-10);
                }
            }
        }

        // Q H Q^T == A
        let qt = q.transpose();
        let recon = matmul(&matmul(&q, &h), &qt);
        for r in 0..4 {
            for c in 0..4 {
                assert_relative_eq!(recon.get(r, c), a.get(r, c), epsilon = 1e-8);
            }
        }
    }
}
