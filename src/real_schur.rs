//! Real Francis double-shift / Rayleigh single-shift QR iteration (§4.3 / §6).
//!
//! Stays entirely in the real field `R` throughout, including through
//! complex-conjugate eigenvalue pairs: a pair is represented implicitly by a
//! 2x2 diagonal block of the quasi-triangular result (§3's data model) rather
//! than by switching to complex arithmetic, exactly as the distilled
//! specification's shift-surrogate formulation (`x`, `y`, `w` standing in for
//! the trailing 2x2 block without ever forming its complex eigenvalues
//! directly) describes. The bulge this driver chases is one column wider
//! than the complex driver's (three extra subdiagonals instead of one),
//! which is why it uses an explicit three-element elementary reflector
//! (`p`, `q`, `r`) built by hand rather than the two-element
//! [`crate::givens::GivensRotation`] the rest of the crate shares — the same
//! tradeoff the teacher's own Hessenberg/tridiagonal code makes when a
//! rotation's natural width stops being two.

use crate::base::OMatrix;
use crate::error::{Error, Result};
use crate::options::{Options, ShiftMethod};
use crate::scalar::{ComplexScalar, RealScalar};
use crate::trace::{trace_event, trace_sweep, Diagnostics};
use num_complex::Complex;

/// The real scalar types this driver runs over are also, trivially, their
/// own complex field (§ scalar.rs), which is all [`crate::givens::GivensRotation`]
/// needs to build the 2x2 standardizing rotation in [`standardize_real_pair`].
pub trait RealField: RealScalar + ComplexScalar<Real = Self> {}
impl<R: RealScalar + ComplexScalar<Real = R>> RealField for R {}

#[inline]
fn sign_of<R: RealScalar>(magnitude: R, sign_source: R) -> R {
    let m = RealScalar::abs(magnitude);
    if sign_source >= R::zero() {
        m
    } else {
        -m
    }
}

fn ahues_tisseur_deflates_real<R: RealScalar>(h: &OMatrix<R>, m: usize, eps: R, small: R) -> bool {
    let h_mm = h.get(m, m);
    let h_mm1 = h.get(m, m + 1);
    let h_m1m = h.get(m + 1, m);
    let h_m1m1 = h.get(m + 1, m + 1);

    let ab = max_r(h_m1m.abs(), h_mm1.abs());
    let ba = min_r(h_m1m.abs(), h_mm1.abs());
    let diff = h_mm - h_m1m1;
    let aa = max_r(h_m1m1.abs(), diff.abs());
    let bb = min_r(h_m1m1.abs(), diff.abs());

    let s = aa + ab;
    if s == R::zero() {
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

/// Standardizes a real-eigenvalue trailing 2x2 block (rows/cols
/// `hi-1, hi`) into genuine upper-triangular form via a single orthogonal
/// similarity built from the eigenvector of the eigenvalue nearer `a[hi,hi]`
/// — see DESIGN.md for the derivation (`V^T A V` with `V`'s first row equal
/// to the normalized eigenvector, which [`crate::givens::GivensRotation::new`]
/// produces directly).
fn standardize_real_pair<R: RealField>(h: &mut OMatrix<R>, z: Option<&mut OMatrix<R>>, hi: usize) {
    let n = h.ncols();
    let a = h.get(hi - 1, hi - 1);
    let d = h.get(hi, hi);
    let c = h.get(hi, hi - 1);
    if c == R::zero() {
        return;
    }
    let xbar = (a + d).scale_half();
    let p = (a - d).scale_half();
    let bc = h.get(hi - 1, hi) * c;
    let q = p * p + bc;
    if q < R::zero() {
        // Non-real conjugate pair: leave the 2x2 block as is: it already
        // encodes the pair, and there is no real orthogonal similarity that
        // triangularizes it further.
        return;
    }
    let lambda1 = xbar + RealScalar::sqrt(q);

    let v0 = lambda1 - d;
    let v1 = c;
    let (rot, _r) = crate::givens::GivensRotation::<R>::new(v0, v1);
    rot.rotate_rows(h, hi - 1, 0, n);
    rot.rotate_columns(h, hi - 1, 0, n);
    if let Some(z) = z {
        rot.rotate_columns(z, hi - 1, 0, n);
    }
    h.set(hi, hi - 1, R::zero());
}

trait ScaleHalf: RealScalar {
    fn scale_half(self) -> Self {
        self / (Self::one() + Self::one())
    }
}
impl<R: RealScalar> ScaleHalf for R {}

/// Runs the real double-shift QR iteration on `h` in place, accumulating
/// into `z` when requested.
pub fn real_qr_iteration<R: RealField>(
    h: &mut OMatrix<R>,
    mut z: Option<&mut OMatrix<R>>,
    options: &Options<R>,
) -> Result<Diagnostics> {
    let n = h.nrows();
    let mut diag = Diagnostics::default();
    if n == 0 {
        return Ok(diag);
    }
    let (maxiter, maxinner) = options.resolved(n);
    let eps = options.tol;
    let small = R::safe_min();
    let debug = options.debug;
    let rayleigh = options.shiftmethod == ShiftMethod::Rayleigh;

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

            // 1. Deflation scan.
            let mut new_lo = lo;
            let mut m = hi;
            while m > lo {
                m -= 1;
                let sub = h.get(m + 1, m);
                if RealScalar::abs(sub) <= small {
                    new_lo = m + 1;
                    break;
                }
                let mut tst = RealScalar::abs(h.get(m, m)) + RealScalar::abs(h.get(m + 1, m + 1));
                if tst == R::zero() {
                    if m > lo {
                        tst += RealScalar::abs(h.get(m, m - 1));
                    }
                    if m + 2 <= hi {
                        tst += RealScalar::abs(h.get(m + 2, m + 1));
                    }
                }
                if RealScalar::abs(sub) <= eps * tst && ahues_tisseur_deflates_real(h, m, eps, small) {
                    new_lo = m + 1;
                    break;
                }
            }
            lo = new_lo;

            // 2. Cleanup.
            if lo > 0 {
                h.set(lo, lo - 1, R::zero());
            }

            // 3. Single / double deflation.
            if lo >= hi {
                iend -= 1;
                deflated = true;
                break;
            }
            if lo == hi - 1 {
                standardize_real_pair(h, z.as_deref_mut(), hi);
                iend -= 2;
                deflated = true;
                break;
            }

            trace_sweep!(debug, "real qr: window [{}, {}], sweep {}", lo, hi, its);

            // 4. Shift selection. The Wilkinson-like exceptional shift fires
            // every 10th outer iteration (SPEC_FULL.md §4.3), distinct from
            // the complex driver's `its % 30 == 10/20` cadence.
            let (x, y, w) = if !rayleigh && its % 10 == 0 {
                diag.exceptional_shifts += 1;
                let s = RealScalar::abs(h.get(hi, hi - 1)) + RealScalar::abs(h.get(hi - 1, hi - 2));
                let bump = s * R::from_usize(3) / R::from_usize(4);
                let w = -(s * s) * R::from_usize(7) / R::from_usize(16);
                (bump, bump, w)
            } else if rayleigh {
                let shift = h.get(hi, hi);
                (shift, shift, R::zero())
            } else {
                (
                    h.get(hi, hi),
                    h.get(hi - 1, hi - 1),
                    h.get(hi, hi - 1) * h.get(hi - 1, hi),
                )
            };

            // 5. Bulge creation and chase.
            let mut m_start = hi.saturating_sub(2).max(lo);
            let (mut p, mut q, mut r2);
            loop {
                let zv = h.get(m_start, m_start);
                let r_ = x - zv;
                let s_ = y - zv;
                let mut pp = (r_ * s_ - w) / h.get(m_start + 1, m_start) + h.get(m_start, m_start + 1);
                let mut qq = h.get(m_start + 1, m_start + 1) - zv - r_ - s_;
                let mut rr = h.get(m_start + 2, m_start + 1);
                let snorm = RealScalar::abs(pp) + RealScalar::abs(qq) + RealScalar::abs(rr);
                if snorm != R::zero() {
                    pp = pp / snorm;
                    qq = qq / snorm;
                    rr = rr / snorm;
                }
                if m_start == lo {
                    p = pp;
                    q = qq;
                    r2 = rr;
                    break;
                }
                let u = RealScalar::abs(h.get(m_start, m_start - 1)) * (RealScalar::abs(qq) + RealScalar::abs(rr));
                let v = RealScalar::abs(pp)
                    * (RealScalar::abs(h.get(m_start - 1, m_start - 1))
                        + RealScalar::abs(zv)
                        + RealScalar::abs(h.get(m_start + 1, m_start + 1)));
                if u <= eps * v {
                    p = pp;
                    q = qq;
                    r2 = rr;
                    break;
                }
                m_start -= 1;
            }

            for i in (m_start + 2)..=hi {
                h.set(i, i - 2, R::zero());
                if i != m_start + 2 {
                    h.set(i, i - 3, R::zero());
                }
            }

            for k in m_start..=hi - 1 {
                let mut xnorm = R::zero();
                if k != m_start {
                    let mut pk = h.get(k, k - 1);
                    let mut qk = h.get(k + 1, k - 1);
                    let mut rk = if k != hi - 1 { h.get(k + 2, k - 1) } else { R::zero() };
                    let norm = RealScalar::abs(pk) + RealScalar::abs(qk) + RealScalar::abs(rk);
                    if norm != R::zero() {
                        pk = pk / norm;
                        qk = qk / norm;
                        rk = rk / norm;
                    }
                    p = pk;
                    q = qk;
                    r2 = rk;
                    xnorm = norm;
                }

                let s_ = sign_of(RealScalar::sqrt(p * p + q * q + r2 * r2), p);
                if s_ == R::zero() {
                    continue;
                }

                if k == m_start {
                    if lo != m_start {
                        h.set(k, k - 1, -h.get(k, k - 1));
                    }
                } else {
                    h.set(k, k - 1, -s_ * xnorm);
                }

                p += s_;
                let x2 = p / s_;
                let y2 = q / s_;
                let z2 = r2 / s_;
                q /= p;
                r2 /= p;

                for j in k..n {
                    let mut pj = h.get(k, j) + q * h.get(k + 1, j);
                    if k != hi - 1 {
                        pj += r2 * h.get(k + 2, j);
                        h.set(k + 2, j, h.get(k + 2, j) - pj * z2);
                    }
                    h.set(k + 1, j, h.get(k + 1, j) - pj * y2);
                    h.set(k, j, h.get(k, j) - pj * x2);
                }

                let row_hi = std::cmp::min(k + 3, hi);
                for i in 0..=row_hi {
                    let mut pi = x2 * h.get(i, k) + y2 * h.get(i, k + 1);
                    if k != hi - 1 {
                        pi += z2 * h.get(i, k + 2);
                        h.set(i, k + 2, h.get(i, k + 2) - pi * r2);
                    }
                    h.set(i, k + 1, h.get(i, k + 1) - pi * q);
                    h.set(i, k, h.get(i, k) - pi);
                }
                if let Some(z) = z.as_deref_mut() {
                    for i in 0..n {
                        let mut pi = x2 * z.get(i, k) + y2 * z.get(i, k + 1);
                        if k != hi - 1 {
                            pi += z2 * z.get(i, k + 2);
                            z.set(i, k + 2, z.get(i, k + 2) - pi * r2);
                        }
                        z.set(i, k + 1, z.get(i, k + 1) - pi * q);
                        z.set(i, k, z.get(i, k) - pi);
                    }
                }
            }
        }

        if !deflated {
            return Err(Error::IterationLimit {
                istart: lo,
                iend: iend as usize,
                maxiter,
            });
        }
    }

    trace_event!(debug, "real qr: fully deflated after {} iterations", total_iters);
    Ok(diag)
}

/// Synthesizes the (possibly complex) eigenvalue vector from a quasi-
/// triangular `h`: a 1x1 diagonal block (negligible subdiagonal) contributes
/// one real eigenvalue, a surviving 2x2 block contributes a conjugate pair
/// `t/2 +- sqrt(t^2/4 - d)` formed from its trace/determinant (§4.3,
/// "Eigenvalue synthesis").
pub fn synthesize_eigenvalues<R: RealScalar>(h: &OMatrix<R>) -> Vec<Complex<R>> {
    let n = h.nrows();
    let eps = R::epsilon();
    let mut w = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        let is_last = i + 1 == n;
        let sub = if is_last { R::zero() } else { RealScalar::abs(h.get(i + 1, i)) };
        let scale = if is_last {
            R::zero()
        } else {
            RealScalar::abs(h.get(i, i)) + RealScalar::abs(h.get(i + 1, i + 1))
        };

        if is_last || sub <= eps * scale {
            w.push(Complex::new(h.get(i, i), R::zero()));
            i += 1;
            continue;
        }

        let a = h.get(i, i);
        let b = h.get(i, i + 1);
        let c = h.get(i + 1, i);
        let d = h.get(i + 1, i + 1);
        let two = R::one() + R::one();
        let x = (a + d) / two;
        let det = a * d - b * c;
        let disc = x * x - det;

        if disc >= R::zero() {
            let s = RealScalar::sqrt(disc);
            w.push(Complex::new(x + s, R::zero()));
            w.push(Complex::new(x - s, R::zero()));
        } else {
            let s = RealScalar::sqrt(-disc);
            w.push(Complex::new(x, s));
            w.push(Complex::new(x, -s));
        }
        i += 2;
    }
    w
}

/// Promotes a real quasi-triangular Schur factor to a genuine complex
/// upper-triangular one (LAPACK's `rsf2csf`), so that [`crate::eigenvectors::right_eigenvectors`]
/// — specified in §4.4 over a complex upper-triangular `T` — can also serve
/// real-path callers. Each surviving 2x2 block is diagonalized in place by
/// the complex eigenbasis of its canonical (`dlanv2`-standardized) form:
/// for a block `[[p, q], [-q, p]]` with `q > 0`, `(1, i)` and `(1, -i)` are
/// eigenvectors for `p +- iq`, so the similarity `diag(.., 1, i, ..)`-like
/// column pair triangularizes it without perturbing any other entry.
pub fn promote_to_complex_schur<R: RealField>(
    t: &OMatrix<R>,
    z: Option<&OMatrix<R>>,
) -> (OMatrix<Complex<R>>, Option<OMatrix<Complex<R>>>) {
    let n = t.nrows();
    let zero = Complex::new(R::zero(), R::zero());
    let two = R::one() + R::one();

    let mut ct = OMatrix::<Complex<R>>::from_element(n, n, zero);
    for r in 0..n {
        for c in 0..n {
            ct.set(r, c, Complex::new(t.get(r, c), R::zero()));
        }
    }
    let mut cz = z.map(|z0| {
        let mut m = OMatrix::<Complex<R>>::from_element(n, n, zero);
        for r in 0..n {
            for c in 0..n {
                m.set(r, c, Complex::new(z0.get(r, c), R::zero()));
            }
        }
        m
    });

    // Left-multiplies rows (i, i+1) across all columns by V^-1 = [[1/2, -i/2], [1/2, i/2]]:
    // new_top = (top - i*bot)/2, new_bot = (top + i*bot)/2, where `i*z = (-z.im, z.re)`.
    let apply_rows = |m: &mut OMatrix<Complex<R>>, i: usize| {
        for col in 0..n {
            let top = m.get(i, col);
            let bot = m.get(i + 1, col);
            let new_top = Complex::new((top.re + bot.im) / two, (top.im - bot.re) / two);
            let new_bot = Complex::new((top.re - bot.im) / two, (top.im + bot.re) / two);
            m.set(i, col, new_top);
            m.set(i + 1, col, new_bot);
        }
    };
    // Right-multiplies columns (i, i+1) across all rows by V = [[1, 1], [i, -i]]:
    // new_left = left + i*right, new_right = left - i*right.
    let apply_cols = |m: &mut OMatrix<Complex<R>>, i: usize| {
        for row in 0..n {
            let left = m.get(row, i);
            let right = m.get(row, i + 1);
            let new_left = Complex::new(left.re - right.im, left.im + right.re);
            let new_right = Complex::new(left.re + right.im, left.im - right.re);
            m.set(row, i, new_left);
            m.set(row, i + 1, new_right);
        }
    };

    let mut i = 0;
    while i < n {
        if i + 1 == n {
            i += 1;
            continue;
        }
        let c_lo = ct.get(i + 1, i);
        if c_lo.re == R::zero() {
            i += 1;
            continue;
        }

        let a = ct.get(i, i).re;
        let b = ct.get(i, i + 1).re;
        let c = ct.get(i + 1, i).re;
        let d = ct.get(i + 1, i + 1).re;
        let p = (a + d) / two;
        let det = a * d - b * c;
        let disc = p * p - det;
        if disc >= R::zero() {
            // Already a real pair (should have been deflated as two 1x1s);
            // nothing to promote.
            i += 1;
            continue;
        }
        let q = RealScalar::sqrt(-disc);

        apply_rows(&mut ct, i);
        apply_cols(&mut ct, i);
        if let Some(cz) = &mut cz {
            apply_cols(cz, i);
        }

        ct.set(i, i, Complex::new(p, q));
        ct.set(i + 1, i + 1, Complex::new(p, -q));
        ct.set(i + 1, i, zero);

        i += 2;
    }

    (ct, cz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn is_quasi_triangular(h: &OMatrix<f64>, tol: f64) -> bool {
        let n = h.nrows();
        let mut c = 0usize;
        while c < n {
            for r in (c + 1)..n {
                let allowed = r == c + 1;
                if !allowed && RealScalar::abs(h.get(r, c)) > tol {
                    return false;
                }
            }
            if c + 1 < n && RealScalar::abs(h.get(c + 1, c)) > tol {
                // a genuine 2x2 block must not itself have a subdiagonal
                // successor (blocks don't chain).
                if c + 2 < n && RealScalar::abs(h.get(c + 2, c + 1)) > tol {
                    return false;
                }
                c += 2;
            } else {
                c += 1;
            }
        }
        true
    }

    #[test]
    fn already_triangular_deflates_immediately() {
        let mut h = OMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 3.0]);
        let opts = Options::default();
        real_qr_iteration(&mut h, None, &opts).unwrap();
        assert!(is_quasi_triangular(&h, 1e-10));
        assert_relative_eq!(h.get(0, 0), 1.0, epsilon = 1e-10);
        assert_relative_eq!(h.get(1, 1), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn real_rotation_block_becomes_upper_triangular() {
        // A symmetric 2x2 rotation generator: real, distinct eigenvalues.
        let mut h = OMatrix::from_row_slice(2, 2, &[2.0, 1.0, 3.0, 4.0]);
        let opts = Options::default();
        real_qr_iteration(&mut h, None, &opts).unwrap();
        assert!(is_quasi_triangular(&h, 1e-8));
    }

    #[test]
    fn complex_conjugate_pair_survives_as_2x2_block() {
        // Eigenvalues of [[0,-1],[1,0]] are +-i: must remain a 2x2 block.
        let mut h = OMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let opts = Options::default();
        real_qr_iteration(&mut h, None, &opts).unwrap();
        assert!(RealScalar::abs(h.get(1, 0)) > 1e-6);
    }

    #[test]
    fn reduces_a_larger_hessenberg_block() {
        let mut h = OMatrix::from_row_slice(
            4,
            4,
            &[
                2.0, -1.0, 0.5, 0.3, 1.0, 3.0, -2.0, 0.1, 0.0, 1.5, 0.0, -0.5, 0.0, 0.0, 0.7, 1.0,
            ],
        );
        let opts = Options::default();
        real_qr_iteration(&mut h, None, &opts).unwrap();
        assert!(is_quasi_triangular(&h, 1e-7));
    }

    #[test]
    fn iteration_limit_is_reported_when_budget_is_too_small() {
        let mut h = OMatrix::from_row_slice(
            4,
            4,
            &[
                2.0, -1.0, 0.5, 0.3, 1.0, 3.0, -2.0, 0.1, 0.0, 1.5, 0.0, -0.5, 0.0, 0.0, 0.7, 1.0,
            ],
        );
        let opts = Options::default().with_max_iter(1).with_max_inner(1);
        let err = real_qr_iteration(&mut h, None, &opts).unwrap_err();
        assert!(matches!(err, Error::IterationLimit { .. }));
    }

    #[test]
    fn synthesizes_real_eigenvalues_from_a_1x1_block() {
        let h = OMatrix::from_row_slice(2, 2, &[5.0, 1.0, 0.0, -2.0]);
        let w = synthesize_eigenvalues(&h);
        assert_relative_eq!(w[0].re, 5.0, epsilon = 1e-12);
        assert_relative_eq!(w[0].im, 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[1].re, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn synthesizes_conjugate_pair_from_a_2x2_block() {
        let h = OMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let w = synthesize_eigenvalues(&h);
        assert_relative_eq!(w[0].re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(RealScalar::abs(w[0].im), 1.0, epsilon = 1e-12);
        assert_relative_eq!(w[1].re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[0].im, -w[1].im, epsilon = 1e-12);
    }

    #[test]
    fn promotes_a_conjugate_block_to_complex_upper_triangular() {
        let t = OMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let (ct, cz) = promote_to_complex_schur(&t, None);
        assert!(cz.is_none());
        assert_relative_eq!(ct.get(1, 0).re, 0.0, epsilon = 1e-10);
        assert_relative_eq!(ct.get(1, 0).im, 0.0, epsilon = 1e-10);
        assert_relative_eq!(ct.get(0, 0).im, -ct.get(1, 1).im, epsilon = 1e-10);
        assert_relative_eq!(RealScalar::abs(ct.get(0, 0).im), 1.0, epsilon = 1e-10);
    }
}
