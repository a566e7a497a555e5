//! Reconstruction of the solution between internal steps.
//!
//! Two strategies are available:
//! - [`DenseOutput`]: the continuous extension of a tableau that carries
//!   dense-output weights, valid inside the last accepted step.
//! - [`KnotBuffer`]: Neville-Aitken polynomial interpolation over a sliding
//!   window of the last accepted states, used for every other tableau.

mod dense;
mod neville;

pub use dense::{DenseOutput, contd5};
pub use neville::{KNOTS, KnotBuffer, neville};

use crate::Float;

/// Trait for interpolating the solution within a step.
pub trait Interpolate {
    /// Interpolate the solution at the given time `ti`.
    fn interpolate(&self, ti: Float, yi: &mut [Float]);
}
