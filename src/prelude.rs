//! Convenient prelude: import the most commonly used traits, types, and functions.
//!
//! ```rust
//! use rkauto::prelude::*;
//! ```

pub use crate::{
    Diagnostics, Error, Float, Interpolate, Native, ODE, Options, Solution, Status, Tableau,
    Tolerance, rk_auto,
};
