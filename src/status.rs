//! Status codes for the integrator

/// Terminal status of an integration run.
///
/// The integer codes returned by [`Status::code`] follow the `istate[0]`
/// convention of the classical multistep solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the end of the integration interval.
    Success,
    /// At least one step was forced to the minimum step size. The run
    /// completed, but accuracy may be degraded.
    StepSizeBelowMin,
    /// The step attempt budget `nmax` was exhausted before reaching the end.
    NeedLargerNMax,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 2,
            Status::NeedLargerNMax => -1,
            Status::StepSizeBelowMin => -2,
        }
    }

    /// `true` if the output matrix covers the whole output grid.
    pub fn completed(self) -> bool {
        !matches!(self, Status::NeedLargerNMax)
    }
}
