//! Options for the adaptive integrator

use bon::Builder;

use crate::{Float, tolerance::Tolerance};

#[derive(Builder, Clone, Debug)]
/// Options for [`crate::rk_auto`].
///
/// # Example
///
/// ```
/// use rkauto::Options;
///
/// let options = Options::builder()
///     .rtol(1e-8)
///     .atol([1e-10, 1e-8])
///     .hmax(0.5)
///     .build();
/// assert_eq!(options.nmax, 5000);
/// ```
pub struct Options {
    /// Relative tolerance for error estimation.
    #[builder(default = Tolerance::Scalar(1e-6), into)]
    pub rtol: Tolerance,
    /// Absolute tolerance for error estimation.
    #[builder(default = Tolerance::Scalar(1e-6), into)]
    pub atol: Tolerance,
    /// Critical time. The integrator runs to `max(times[nt - 1], tcrit)`.
    pub tcrit: Option<Float>,
    /// Minimum step size. Steps that would shrink below it are forced
    /// through at `hmin` and flagged in the status.
    #[builder(default = 0.0)]
    pub hmin: Float,
    /// Maximum step size. Defaults to the length of the integration interval.
    pub hmax: Option<Float>,
    /// Initial step size. None will result in an initial guess from the
    /// derivative-based starting step heuristic.
    pub hini: Option<Float>,
    /// Maximum number of step attempts (accepted and rejected).
    #[builder(default = 5000)]
    pub nmax: usize,
    /// Promote step-floor, step-budget and summary messages to the
    /// `warn`/`info` log levels.
    #[builder(default = false)]
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options::builder().build()
    }
}
