//! Adaptive embedded Runge-Kutta integration of initial value problems
//! over a fixed grid of output times.
//!
//! [`rk_auto`] advances `y' = f(t, y, p)` with an embedded explicit pair
//! described by a [`Tableau`], controls the step size from the difference of
//! the pair's two solutions, and reconstructs the solution at every requested
//! output time with the tableau's dense output or by Neville-Aitken
//! interpolation.
//!
//! ```
//! use rkauto::prelude::*;
//!
//! let mut f = Native::new(|_t: Float, y: &[Float], _p: &(), dydt: &mut [Float], _out: &mut [Float]| {
//!     dydt[0] = y[1];
//!     dydt[1] = -y[0];
//! });
//! let times: Vec<Float> = (0..=10).map(|i| i as Float * 0.5).collect();
//! let options = Options::builder().rtol(1e-8).atol(1e-8).build();
//! let sol = rk_auto(&mut f, &[0.0, 1.0], &times, &(), &Tableau::rk45dp7(), &options).unwrap();
//! assert_eq!(sol.status(), Status::Success);
//! assert!((sol.state(0)[10] - (5.0 as Float).sin()).abs() < 1e-6);
//! ```

mod control;
mod error;
mod hinit;
mod integrate;
mod matrix;
mod ode;
mod options;
mod solution;
mod status;
mod tableau;
mod tolerance;

pub mod interpolate;
pub mod prelude;
#[cfg(feature = "python")]
pub mod python;

pub use error::Error;
pub use integrate::rk_auto;
pub use interpolate::Interpolate;
pub use ode::{Native, ODE};
pub use options::Options;
pub use solution::{Diagnostics, Solution};
pub use status::Status;
pub use tableau::Tableau;
pub use tolerance::Tolerance;

// Prevent selecting two incompatible float precision features at once.
#[cfg(all(feature = "f32", feature = "f64"))]
compile_error!(
    "features 'f32' and 'f64' cannot both be enabled; pick exactly one Float precision feature"
);

/// Change this to f128, f64, f32 as desired.
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f64")]
pub type Float = f64;
