//! Error kinds surfaced to callers of `schur`/`eigvals`/`eigvecs`.
//!
//! The teacher mostly signals failure with `Option` (see
//! `SymmetricEigen::try_new`, which returns `None` on non-convergence). The
//! distilled specification instead names three distinct error kinds that a
//! caller may want to match on individually, so this crate follows the
//! sibling LAPACK-wrapper crate in the example pack (`lax`, which wraps
//! `*geev`/`*heev` and reports illegal-argument vs. non-convergence via a
//! `thiserror`-derived enum) rather than the teacher's own `Option` idiom.

use thiserror::Error;

/// Errors produced by the Schur engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The input matrix is not square.
    #[error("Schur decomposition requires a square matrix, got {rows}x{cols}")]
    NonSquareInput { rows: usize, cols: usize },

    /// The QR driver exhausted its iteration budget without deflating the
    /// active window to completion.
    #[error(
        "QR iteration did not converge within {maxiter} iterations \
         (active window [{istart}, {iend}] never fully deflated)"
    )]
    IterationLimit {
        istart: usize,
        iend: usize,
        maxiter: usize,
    },

    /// An option value the core does not know how to honor (currently: an
    /// unrecognized `shiftmethod`).
    #[error("invalid option: {detail}")]
    InvalidOption { detail: String },
}

pub type Result<T> = std::result::Result<T, Error>;
