//! Errors for the adaptive Runge-Kutta integrator

use thiserror::Error;

use crate::Float;

/// Validation errors returned by [`crate::rk_auto`] before the integration
/// loop starts, plus the internal-consistency error raised if the output
/// cursor ever runs past the output matrix.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("at least 2 output times are required (got {0})")]
    TooFewTimes(usize),

    #[error("output times must be strictly increasing (times[{index}] = {value} <= {previous})")]
    TimesNotIncreasing {
        index: usize,
        value: Float,
        previous: Float,
    },

    #[error("initial state must not be empty")]
    EmptyState,

    #[error("{name} must have length 1 or {neq} (got {len})")]
    ToleranceLength {
        name: &'static str,
        len: usize,
        neq: usize,
    },

    #[error("{name} must be non-negative (got {value})")]
    NegativeTolerance { name: &'static str, value: Float },

    #[error("tableau field {field} has dimension {found} but {expected} was expected")]
    TableauDimension {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("tableau {0} has no embedded weights b2; error control is impossible")]
    MissingEmbeddedWeights(&'static str),

    #[error("tableau A must be strictly lower triangular (A[{row}, {col}] = {value})")]
    NotExplicit { row: usize, col: usize, value: Float },

    #[error("tableau order Qerr must be positive (got {0})")]
    InvalidOrder(Float),

    #[error("step bounds must satisfy 0 <= hmin <= hmax and hmax > 0 (got hmin = {hmin}, hmax = {hmax})")]
    InvalidStepBounds { hmin: Float, hmax: Float },

    #[error("initial step hini must be positive (got {0})")]
    InvalidInitialStep(Float),

    #[error("nmax must be positive (got {0})")]
    NMaxMustBePositive(usize),

    #[error("tcrit = {tcrit} lies before the initial time {t0}")]
    TCritBeforeStart { tcrit: Float, t0: Float },

    #[error("output cursor {cursor} overran the {rows} rows of the output matrix")]
    OutputOverrun { cursor: usize, rows: usize },
}
