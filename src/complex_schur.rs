//! Complex single-shift QR iteration (§4.2 / §6).
//!
//! Drives a Hessenberg matrix `H` of scalar type `N` (where `N` stands for
//! `Self` in the specification's complex variant) to upper-triangular form by
//! repeated deflation-scan / shift / bulge-chase sweeps, mirroring the
//! teacher's `SymmetricEigen` convergence loop (`try_new`'s `while end != 0`
//! structure) but generalized from tridiagonal-symmetric to
//! Hessenberg-general and from real to the full complex field.

use crate::accum::Accum;
use crate::base::OMatrix;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::scalar::{ComplexScalar, RealScalar};
use crate::trace::{trace_event, trace_sweep, Diagnostics};
use crate::givens::GivensRotation;

/// Runs the complex single-shift QR iteration on `h` in place, accumulating
/// into `z` when requested. `h` must already be upper Hessenberg. On return,
/// `h` is upper triangular and its diagonal holds the eigenvalues.
pub fn complex_qr_iteration<N: ComplexScalar>(
    h: &mut OMatrix<N>,
    mut z: Accum<N>,
    options: &Options<N::Real>,
) -> Result<Diagnostics> {
    let n = h.nrows();
    let mut diag = Diagnostics::default();
    if n == 0 {
        return Ok(diag);
    }
    let (maxiter, maxinner) = options.resolved(n);
    let eps = N::Real::epsilon();
    // smallnum = safe_min * (n / eps), per SPEC_FULL.md §4.2/§5 (LAPACK
    // zlahqr's `smlnum = safmin*(n/ulp)`), not bare safe_min.
    let small = N::Real::safe_min() * N::Real::from_usize(n) / eps;
    let debug = options.debug;

    // iend, lo are the (0-based, inclusive) bounds of the still-active
    // window; the outer loop peels eigenvalues off the bottom as it deflates.
    let mut iend: isize = n as isize - 1;
    let mut total_iters: usize = 0;

    while iend >= 0 {
        if iend == 0 {
            break;
        }
        diag.outer_iterations += 1;
        let mut lo: usize = 0;
        let mut deflated = false;

        for its in 1..=maxinner {
            total_iters += 1;
            diag.inner_sweeps += 1;
            if total_iters > maxiter {
                return Err(Error::IterationLimit {
                    istart: lo,
                    iend: iend as usize,
                    maxiter,
                });
            }

            let hi = iend as usize;

            // 1. Deflation scan: look for a negligible subdiagonal entry,
            // scanning upward from just below the active window.
            let mut new_lo = lo;
            let mut m = hi;
            while m > lo {
                m -= 1;
                let sub = h.get(m + 1, m);
                if sub.norm1() <= small {
                    new_lo = m + 1;
                    break;
                }
                let tst = h.get(m, m).norm1() + h.get(m + 1, m + 1).norm1();
                let tst = if tst == N::Real::zero() {
                    let mut t = tst;
                    if m > lo {
                        t += h.get(m, m - 1).re().abs();
                    }
                    if m + 2 <= hi {
                        t += h.get(m + 2, m + 1).re().abs();
                    }
                    t
                } else {
                    tst
                };
                if sub.re().abs() <= eps * tst && ahues_tisseur_deflates(h, m, eps, small) {
                    new_lo = m + 1;
                    break;
                }
            }
            lo = new_lo;

            // 2. Cleanup: the entry we just judged negligible is forced
            // exactly to zero.
            if lo > 0 {
                h.set(lo, lo - 1, N::zero());
            }

            // 3. Single-element deflation.
            if lo >= hi {
                iend -= 1;
                deflated = true;
                break;
            }

            trace_sweep!(debug, "complex qr: window [{}, {}], sweep {}", lo, hi, its);

            // 4. Shift selection.
            let shift = if its % 30 == 10 {
                diag.exceptional_shifts += 1;
                let bump = h.get(lo + 1, lo).re().abs() * N::Real::from_usize(3)
                    / N::Real::from_usize(4);
                h.get(lo, lo) + N::from_real(bump)
            } else if its % 30 == 20 {
                diag.exceptional_shifts += 1;
                let bump = h.get(hi, hi - 1).re().abs() * N::Real::from_usize(3)
                    / N::Real::from_usize(4);
                h.get(hi, hi) + N::from_real(bump)
            } else {
                wilkinson_like_shift(
                    h.get(hi - 1, hi - 1),
                    h.get(hi, hi),
                    h.get(hi - 1, hi),
                    h.get(hi, hi - 1),
                )
            };

            // 5. Bulge creation and chase.
            let m_start = find_bulge_start(h, lo, hi, shift, eps);
            chase_bulge(h, &mut z, m_start, hi, shift);
        }

        if !deflated {
            return Err(Error::IterationLimit {
                istart: lo,
                iend: iend as usize,
                maxiter,
            });
        }
    }

    trace_event!(debug, "complex qr: fully deflated after {} iterations", total_iters);
    Ok(diag)
}

/// The Ahues-Tisseur (1997) refined deflation criterion, applied once the
/// coarse `|sub| <= eps * tst` test passes, to avoid deflating on entries
/// that are small only because of an unlucky diagonal scaling.
fn ahues_tisseur_deflates<N: ComplexScalar>(
    h: &OMatrix<N>,
    m: usize,
    eps: N::Real,
    small: N::Real,
) -> bool {
    let h_mm = h.get(m, m);
    let h_mm1 = h.get(m, m + 1);
    let h_m1m = h.get(m + 1, m);
    let h_m1m1 = h.get(m + 1, m + 1);

    let ab = max_r(h_m1m.norm1(), h_mm1.norm1());
    let ba = min_r(h_m1m.norm1(), h_mm1.norm1());
    let diff = h_mm - h_m1m1;
    let aa = max_r(h_m1m1.norm1(), diff.norm1());
    let bb = min_r(h_m1m1.norm1(), diff.norm1());

    let s = aa + ab;
    if s == N::Real::zero() {
        return true;
    }
    let lhs = ba * (ab / s);
    let rhs_bound = if eps * s > small { eps } else { small / s };
    lhs <= rhs_bound * (bb * (aa / s))
}

#[inline]
fn max_r<R: RealScalar>(a: R, b: R) -> R {
    if a > b {
        a
    } else {
        b
    }
}

#[inline]
fn min_r<R: RealScalar>(a: R, b: R) -> R {
    if a < b {
        a
    } else {
        b
    }
}

/// The root of the trailing 2x2 block `[[h11, h12], [h21, h22]]` nearer
/// `h22`, computed with the sign-aware denominator that the teacher's
/// `wilkinson_shift` (in `linalg/symmetric_eigen.rs`) uses for the symmetric
/// case, generalized from `tmn^2` to the (possibly asymmetric) product
/// `h12 * h21`.
fn wilkinson_like_shift<N: ComplexScalar>(h11: N, h22: N, h12: N, h21: N) -> N {
    let prod = h12 * h21;
    if prod.is_zero_scalar() {
        return h22;
    }
    let d = (h11 - h22).scale(N::Real::one() / N::Real::from_usize(2));
    let disc = (d * d + prod).sqrt();
    let denom = if d.re() >= N::Real::zero() {
        d + disc
    } else {
        d - disc
    };
    if denom.is_zero_scalar() {
        return h22;
    }
    h22 - prod / denom
}

/// Scans upward from `hi - 1` for the lowest row at which the implicit-shift
/// test holds, falling back to `lo` (a fresh bulge at the very top of the
/// window) if none qualifies.
fn find_bulge_start<N: ComplexScalar>(
    h: &OMatrix<N>,
    lo: usize,
    hi: usize,
    shift: N,
    eps: N::Real,
) -> usize {
    if hi < lo + 2 {
        return lo;
    }
    let mut m = hi - 1;
    while m > lo {
        let h11s_raw = h.get(m, m) - shift;
        let sub = h.get(m + 1, m);
        let s = h11s_raw.norm1() + sub.norm1();
        if s != N::Real::zero() {
            let h11s = h11s_raw.scale(N::Real::one() / s);
            let lhs = h.get(m, m - 1).re().abs() * sub.norm1();
            let rhs = eps * h11s.norm1() * (h.get(m, m).norm1() + h.get(m + 1, m + 1).norm1());
            if lhs <= rhs {
                return m;
            }
        }
        m -= 1;
    }
    lo
}

/// Creates a bulge at `(m_start, m_start+1)` via a rotation built from the
/// shifted diagonal entry, then chases it row by row down to `hi`.
fn chase_bulge<N: ComplexScalar>(
    h: &mut OMatrix<N>,
    z: &mut Accum<N>,
    m_start: usize,
    hi: usize,
    shift: N,
) {
    let n = h.ncols();
    let h11s = h.get(m_start, m_start) - shift;
    let g = h.get(m_start + 1, m_start);
    let (rot, _r) = GivensRotation::new(h11s, g);

    rot.rotate_rows(h, m_start, m_start, n);
    let top = std::cmp::min(m_start + 2, hi) + 1;
    rot.rotate_columns(h, m_start, 0, top);
    if let Some(z) = z.as_mut() {
        rot.rotate_columns(z, m_start, 0, z.nrows());
    }

    if m_start + 2 > hi {
        return;
    }
    for i in m_start..=hi - 2 {
        let f = h.get(i + 1, i);
        let g = h.get(i + 2, i);
        let (rot, r) = GivensRotation::new(f, g);
        rot.rotate_rows(h, i + 1, i, n);
        h.set(i + 1, i, r);
        h.set(i + 2, i, N::zero());

        let top = std::cmp::min(i + 3, hi) + 1;
        rot.rotate_columns(h, i + 1, 0, top);
        if let Some(z) = z.as_mut() {
            rot.rotate_columns(z, i + 1, 0, z.nrows());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex;

    fn is_upper_triangular(h: &OMatrix<Complex<f64>>, tol: f64) -> bool {
        for r in 0..h.nrows() {
            for c in 0..r {
                if h.get(r, c).norm1() > tol {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn already_triangular_deflates_immediately() {
        let mut h = OMatrix::from_row_slice(
            2,
            2,
            &[
                Complex::new(1.0, 0.0),
                Complex::new(2.0, 0.0),
                Complex::new(0.0, 0.0),
                Complex::new(3.0, 0.0),
            ],
        );
        let opts = Options::default();
        complex_qr_iteration(&mut h, Accum::None, &opts).unwrap();
        assert!(is_upper_triangular(&h, 1e-12));
        assert_relative_eq!(h.get(0, 0).re, 1.0, epsilon = 1e-10);
        assert_relative_eq!(h.get(1, 1).re, 3.0, epsilon = 1e-10);
    }

    #[test]
    fn reduces_a_small_hessenberg_block_to_triangular() {
        let mut h = OMatrix::from_row_slice(
            3,
            3,
            &[
                Complex::new(2.0, 0.0),
                Complex::new(-1.0, 0.0),
                Complex::new(0.5, 0.0),
                Complex::new(1.0, 0.0),
                Complex::new(3.0, 0.0),
                Complex::new(-2.0, 0.0),
                Complex::new(0.0, 0.0),
                Complex::new(1.5, 0.0),
                Complex::new(0.0, 1.0),
            ],
        );
        let opts = Options::default();
        complex_qr_iteration(&mut h, Accum::None, &opts).unwrap();
        assert!(is_upper_triangular(&h, 1e-8));
    }

    #[test]
    fn iteration_limit_is_reported_when_budget_is_too_small() {
        let mut h = OMatrix::from_row_slice(
            3,
            3,
            &[
                Complex::new(2.0, 0.0),
                Complex::new(-1.0, 0.0),
                Complex::new(0.5, 0.0),
                Complex::new(1.0, 0.0),
                Complex::new(3.0, 0.0),
                Complex::new(-2.0, 0.0),
                Complex::new(0.0, 0.0),
                Complex::new(1.5, 0.0),
                Complex::new(0.0, 1.0),
            ],
        );
        let opts = Options::default().with_max_iter(1).with_max_inner(1);
        let err = complex_qr_iteration(&mut h, Accum::None, &opts).unwrap_err();
        assert!(matches!(err, Error::IterationLimit { .. }));
    }
}
