//! Structured diagnostic tracing.
//!
//! The distilled specification's Design Notes call out the original's
//! printf-style debug output and ask for a "structured event log or a
//! compile-time-gated tracer" instead. This module wraps the `log` crate
//! (used the same way across several systems crates in the example pack) and
//! is only ever invoked behind `options.debug`, so tracing costs nothing when
//! disabled beyond a boolean check.

/// Emits a trace-level event describing one QR sweep, only when `enabled`.
macro_rules! trace_sweep {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            log::trace!($($arg)*);
        }
    };
}

/// Emits a debug-level event describing a coarser-grained milestone (a
/// deflation, an exceptional shift, convergence), only when `enabled`.
macro_rules! trace_event {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            log::debug!($($arg)*);
        }
    };
}

pub(crate) use trace_event;
pub(crate) use trace_sweep;

/// Per-run counters surfaced through [`crate::SchurOutcome::diagnostics`]
/// when `options.debug` is set. Costs nothing when tracing is disabled:
/// both drivers accumulate these unconditionally (they are plain `usize`
/// increments), but the orchestrator only hands them back to the caller
/// behind the `debug` flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Number of outer-loop passes (each ending in a 1x1, or on the real
    /// path possibly a 2x2, deflation).
    pub outer_iterations: usize,
    /// Total number of inner sweeps (deflation scan + shift + bulge chase)
    /// across every outer iteration.
    pub inner_sweeps: usize,
    /// Number of times the exceptional-shift branch fired.
    pub exceptional_shifts: usize,
}
