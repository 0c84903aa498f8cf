//! Non-symmetric Schur decomposition (QR algorithm) for dense real and
//! complex matrices.
//!
//! Given a square matrix `A`, [`schur`] produces a unitary/orthogonal `Z`
//! and a (quasi-)triangular `T` such that `A = Z T Z^H`, plus the eigenvalue
//! vector implied by `T`'s diagonal. [`eigvals`] skips the `Z` accumulation.
//! [`eigvecs`] recovers right eigenvectors from a complex upper-triangular
//! `T` (optionally rotated back into `A`'s original basis via `Z`).
//!
//! The crate dispatches on scalar kind via [`SchurScalar`]: real scalars
//! (`f32`/`f64`) route through [`real_schur`]'s Francis double-shift driver
//! and come back as a real quasi-triangular factor with 2x2 blocks standing
//! in for complex-conjugate eigenpairs; complex scalars (`Complex<f32>`/
//! `Complex<f64>`) route through [`complex_schur`]'s single-shift driver and
//! come back fully triangular.

pub mod accum;
pub mod balance;
pub mod base;
pub mod complex_schur;
pub mod eigenvectors;
pub mod error;
pub mod givens;
pub mod hessenberg;
pub mod options;
pub mod real_schur;
pub mod scalar;
mod trace;

pub use accum::Accum;
pub use base::OMatrix;
pub use error::{Error, Result};
pub use options::{Options, ShiftMethod};
pub use scalar::{ComplexScalar, RealScalar};
pub use trace::Diagnostics;

use num_complex::Complex;
use real_schur::RealField;

/// The full output of [`schur`]: the (quasi-)triangular factor, the
/// accumulated Schur vectors (if requested), the eigenvalue vector, and —
/// when `options.debug` is set — the iteration counters the driver
/// accumulated along the way.
#[derive(Clone, Debug)]
pub struct SchurOutcome<N: SchurScalar> {
    /// Upper-triangular (complex path) or quasi-triangular (real path,
    /// isolated 2x2 blocks on the diagonal) Schur factor.
    pub t: OMatrix<N>,
    /// Schur vectors, present when `options.want_z` was set.
    pub z: Option<OMatrix<N>>,
    /// Eigenvalues, in the final diagonal order.
    pub w: Vec<Complex<N::Real>>,
    /// Iteration counters, present only when `options.debug` was set.
    pub diagnostics: Option<Diagnostics>,
}

/// The output of [`eigvals`]: eigenvalues only, no Schur vectors.
#[derive(Clone, Debug)]
pub struct EigenvalueOutcome<R: RealScalar> {
    pub w: Vec<Complex<R>>,
    pub diagnostics: Option<Diagnostics>,
}

/// Scalar-kind dispatch: routes the QR iteration to [`complex_schur`] or
/// [`real_schur`] depending on whether `Self` is already complex, and
/// produces the resulting (always complex-valued) eigenvalue vector.
///
/// Implemented concretely for `f32`, `f64`, `Complex<f32>`, `Complex<f64>` —
/// the four scalar types §3 of the specification names — rather than as one
/// blanket implementation, since the two code paths construct their
/// eigenvalue vectors differently (diagonal readout vs. 2x2-block
/// synthesis) and a single generic impl would have to re-discover which
/// path it is at runtime anyway.
pub trait SchurScalar: ComplexScalar {
    #[doc(hidden)]
    fn run_core(
        h: &mut OMatrix<Self>,
        z: Accum<Self>,
        options: &Options<Self::Real>,
    ) -> Result<(Vec<Complex<Self::Real>>, Diagnostics)>;
}

macro_rules! impl_schur_scalar_real {
    ($t:ty) => {
        impl SchurScalar for $t {
            fn run_core(
                h: &mut OMatrix<$t>,
                mut z: Accum<$t>,
                options: &Options<$t>,
            ) -> Result<(Vec<Complex<$t>>, Diagnostics)> {
                let diagnostics = real_schur::real_qr_iteration(h, z.as_mut(), options)?;
                let w = real_schur::synthesize_eigenvalues(h);
                Ok((w, diagnostics))
            }
        }
    };
}

macro_rules! impl_schur_scalar_complex {
    ($t:ty) => {
        impl SchurScalar for Complex<$t> {
            fn run_core(
                h: &mut OMatrix<Complex<$t>>,
                z: Accum<Complex<$t>>,
                options: &Options<$t>,
            ) -> Result<(Vec<Complex<$t>>, Diagnostics)> {
                let diagnostics = complex_schur::complex_qr_iteration(h, z, options)?;
                let w = (0..h.nrows()).map(|i| h.get(i, i)).collect();
                Ok((w, diagnostics))
            }
        }
    };
}

impl_schur_scalar_real!(f32);
impl_schur_scalar_real!(f64);
impl_schur_scalar_complex!(f32);
impl_schur_scalar_complex!(f64);

/// Full Schur decomposition: `a = Z T Z^H`.
///
/// Checks squareness, optionally rescales `a` into a safe magnitude band
/// (`options.scale`), reduces it to upper Hessenberg form, accumulates the
/// reductor's reflectors into `Z` when `options.want_z` is set, runs the
/// scalar-appropriate QR driver to convergence, and inverse-scales the
/// result. `options.permute` is accepted but otherwise inert — see
/// DESIGN.md, Open Question (b).
pub fn schur<N: SchurScalar>(a: OMatrix<N>, options: &Options<N::Real>) -> Result<SchurOutcome<N>> {
    if !a.is_square() {
        return Err(Error::NonSquareInput {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }

    let n = a.nrows();
    if n == 0 {
        return Ok(SchurOutcome {
            t: a,
            z: if options.want_z { Some(OMatrix::zeros(0, 0)) } else { None },
            w: Vec::new(),
            diagnostics: if options.debug { Some(Diagnostics::default()) } else { None },
        });
    }

    let (matrix, cscale) = if options.scale {
        let scaled = balance::scale_to_safe_range(a);
        (scaled.matrix, scaled.cscale)
    } else {
        (a, N::Real::one())
    };

    let (mut h, mut q) = hessenberg::hessenberg(matrix, options.want_z);

    let accum = match q.as_mut() {
        Some(zz) if options.want_z => Accum::Some(zz),
        _ => Accum::None,
    };

    let (mut w, diagnostics) = N::run_core(&mut h, accum, options)?;

    if cscale != N::Real::one() {
        balance::unscale_in_place(&mut h, cscale);
        for wi in w.iter_mut() {
            *wi = Complex::new(wi.re / cscale, wi.im / cscale);
        }
    }

    Ok(SchurOutcome {
        t: h,
        z: q,
        w,
        diagnostics: if options.debug { Some(diagnostics) } else { None },
    })
}

/// Eigenvalues only: skips `Z` accumulation entirely (`Accum::None` is
/// passed to the driver regardless of `options.want_z`).
pub fn eigvals<N: SchurScalar>(a: OMatrix<N>, options: &Options<N::Real>) -> Result<EigenvalueOutcome<N::Real>> {
    if !a.is_square() {
        return Err(Error::NonSquareInput {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }

    let n = a.nrows();
    if n == 0 {
        return Ok(EigenvalueOutcome {
            w: Vec::new(),
            diagnostics: if options.debug { Some(Diagnostics::default()) } else { None },
        });
    }

    let (matrix, cscale) = if options.scale {
        let scaled = balance::scale_to_safe_range(a);
        (scaled.matrix, scaled.cscale)
    } else {
        (a, N::Real::one())
    };

    let (mut h, _) = hessenberg::hessenberg(matrix, false);
    let (mut w, diagnostics) = N::run_core(&mut h, Accum::None, options)?;

    if cscale != N::Real::one() {
        for wi in w.iter_mut() {
            *wi = Complex::new(wi.re / cscale, wi.im / cscale);
        }
    }

    Ok(EigenvalueOutcome {
        w,
        diagnostics: if options.debug { Some(diagnostics) } else { None },
    })
}

/// Right eigenvectors of a complex upper-triangular Schur factor (§4.4),
/// optionally rotated into the original basis via `z`.
pub fn eigvecs<R: RealScalar>(t: &OMatrix<Complex<R>>, z: Option<&OMatrix<Complex<R>>>) -> OMatrix<Complex<R>>
where
    Complex<R>: ComplexScalar<Real = R>,
{
    eigenvectors::right_eigenvectors(t, z)
}

/// Right eigenvectors of a real quasi-triangular Schur factor: promotes `t`
/// (and `z`, if given) to a genuine complex upper-triangular pair via
/// [`real_schur::promote_to_complex_schur`] first, then runs the same
/// back-substitution as [`eigvecs`]. A convenience for real-path callers,
/// since §4.4 is specified only over a complex upper-triangular `T`.
pub fn eigvecs_real<R: RealField>(t: &OMatrix<R>, z: Option<&OMatrix<R>>) -> OMatrix<Complex<R>>
where
    Complex<R>: ComplexScalar<Real = R>,
{
    let (ct, cz) = real_schur::promote_to_complex_schur(t, z);
    eigenvectors::right_eigenvectors(&ct, cz.as_ref())
}
