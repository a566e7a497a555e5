//! Scaled error norm and step-size control.

use crate::{Float, tolerance::Tolerance};

/// Safety factor applied to the optimal step-size ratio.
const SAFETY: Float = 0.9;
/// Smallest ratio `hnew / h` after a rejected step.
const SCALE_MIN: Float = 0.2;
/// Error norms below this are treated as an exact step.
const ERR_EXACT: Float = 1.0e-20;

/// Weighted Euclidean distance between two candidate solutions.
///
/// Each component is scaled by `atol_i + rtol_i * max(|y1_i|, |y2_i|)`.
/// Components on which both solutions agree contribute nothing, even when
/// their scale is zero. This is the only norm that drives acceptance.
pub fn scaled_error(y1: &[Float], y2: &[Float], atol: &Tolerance, rtol: &Tolerance) -> Float {
    let mut serr: Float = 0.0;
    for i in 0..y1.len() {
        let diff = y2[i] - y1[i];
        if diff == 0.0 {
            continue;
        }
        let scale = atol[i] + rtol[i] * y1[i].abs().max(y2[i].abs());
        let delta = diff / scale;
        serr += delta * delta;
    }
    serr.sqrt()
}

/// Outcome of the error test for one attempted step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDecision {
    pub accept: bool,
    /// Step size proposed for the next attempt.
    pub hnew: Float,
    /// The proposal fell below `hmin` and the step was forced through.
    pub floored: bool,
}

/// Accept or reject a step of size `h` with error norm `err`, and propose the
/// next step size for a method whose step-size exponent is `-1 / qerr`.
///
/// An error of exactly 1 keeps the step and its size. A non-finite error
/// rejects the step and shrinks it by the largest allowed factor.
pub fn decide(err: Float, h: Float, qerr: Float, hmin: Float, hmax: Float) -> StepDecision {
    let mut accept = true;
    let mut hnew = h;
    if !err.is_finite() {
        accept = false;
        hnew = h * SCALE_MIN;
    } else if err < ERR_EXACT {
        hnew = hmax;
    } else if err < 1.0 {
        hnew = hmax.min(h * SAFETY * err.powf(-1.0 / qerr));
    } else if err > 1.0 {
        accept = false;
        hnew = h * (SAFETY * err.powf(-1.0 / qerr)).max(SCALE_MIN);
    }

    let floored = hnew < hmin;
    if floored {
        accept = true;
        hnew = hmin;
    }
    StepDecision {
        accept,
        hnew,
        floored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn euclidean_norm_over_components() {
        let tol = Tolerance::Scalar(0.5);
        // scale_i = 0.5 + 0.5 * 1 = 1
        let err = scaled_error(&[1.0, 1.0], &[0.0, 1.0], &tol, &tol);
        assert_relative_eq!(err, 1.0);
        let err = scaled_error(&[1.0, -1.0], &[0.0, 0.0], &tol, &tol);
        assert_relative_eq!(err, Float::sqrt(2.0));
    }

    #[test]
    fn per_component_tolerances() {
        let atol = Tolerance::Vector(vec![1.0, 2.0]);
        let rtol = Tolerance::Scalar(0.0);
        let err = scaled_error(&[0.0, 0.0], &[3.0, 8.0], &atol, &rtol);
        assert_relative_eq!(err, 5.0);
    }

    #[test]
    fn exact_step_jumps_to_hmax() {
        let d = decide(0.0, 0.1, 4.0, 0.0, 2.0);
        assert_eq!(
            d,
            StepDecision {
                accept: true,
                hnew: 2.0,
                floored: false
            }
        );
    }

    #[test]
    fn accepted_step_grows_but_respects_hmax() {
        let d = decide(1.0 / 16.0, 0.1, 4.0, 0.0, 1.0);
        assert!(d.accept);
        assert_relative_eq!(d.hnew, 0.1 * 0.9 * 2.0);

        let d = decide(1e-12, 0.1, 4.0, 0.0, 0.15);
        assert_eq!(d.hnew, 0.15);
    }

    #[test]
    fn rejected_step_shrinks_at_most_fivefold() {
        let d = decide(16.0, 0.1, 4.0, 0.0, 1.0);
        assert!(!d.accept);
        assert_relative_eq!(d.hnew, 0.1 * (0.9 * 0.5));

        let d = decide(1e12, 0.1, 4.0, 0.0, 1.0);
        assert!(!d.accept);
        assert_relative_eq!(d.hnew, 0.1 * 0.2);
    }

    #[test]
    fn unit_error_keeps_step() {
        let d = decide(1.0, 0.1, 4.0, 0.0, 1.0);
        assert!(d.accept);
        assert_eq!(d.hnew, 0.1);
    }

    #[test]
    fn zero_scale_on_agreeing_component_is_ignored() {
        let atol = Tolerance::Scalar(0.0);
        let rtol = Tolerance::Scalar(0.5);
        let err = scaled_error(&[1.0, 0.0], &[2.0, 0.0], &atol, &rtol);
        assert_relative_eq!(err, 1.0);
    }

    #[test]
    fn non_finite_error_rejects() {
        for err in [Float::NAN, Float::INFINITY] {
            let d = decide(err, 0.1, 4.0, 0.0, 1.0);
            assert!(!d.accept);
            assert_relative_eq!(d.hnew, 0.1 * 0.2);
        }
        // below the floor the step is still forced through and flagged
        let d = decide(Float::NAN, 0.1, 4.0, 0.05, 1.0);
        assert!(d.accept && d.floored);
        assert_eq!(d.hnew, 0.05);
    }

    #[test]
    fn floor_forces_acceptance() {
        let d = decide(1e6, 0.1, 4.0, 0.05, 1.0);
        assert_eq!(
            d,
            StepDecision {
                accept: true,
                hnew: 0.05,
                floored: true
            }
        );
    }
}
