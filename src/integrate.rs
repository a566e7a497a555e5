//! Adaptive embedded Runge-Kutta integration over a fixed output grid.

use log::{Level, log};
use nalgebra::{DMatrix, DVector};

use crate::{
    Float,
    control::{decide, scaled_error},
    error::Error,
    hinit::hinit,
    interpolate::{DenseOutput, KnotBuffer},
    matrix::advance,
    ode::ODE,
    options::Options,
    solution::{Diagnostics, OutputGrid, Solution},
    status::Status,
    tableau::Tableau,
};

/// Integrate `y' = f(t, y, p)` from `times[0]` with state `y0` and report the
/// solution at every entry of `times`.
///
/// The integrator advances with the embedded pair `method`, estimating the
/// local error from the difference of its two solutions and adapting the
/// step size to `options.rtol`/`options.atol` within `[hmin, hmax]`. The
/// embedded solution `y2` (weights `b2`) is the one carried forward.
///
/// Output times rarely coincide with internal steps. After each accepted
/// step, every output time it covers is reconstructed either with the
/// tableau's dense-output polynomial (when `method.d` is present) or by
/// Neville-Aitken interpolation through the last four accepted states.
///
/// Numerical trouble never produces an error: a step forced to `hmin` or an
/// exhausted step budget is reported through [`Solution::status`], and rows
/// not reached keep NaN. Invalid inputs are reported before the first step.
///
/// # Arguments
/// - `f`: right-hand side implementing [`ODE`]. Its `init` hook runs once.
/// - `y0`: initial state at `times[0]`.
/// - `times`: strictly increasing output times, at least two.
/// - `p`: parameters passed to every evaluation of `f`.
/// - `method`: Butcher tableau of an embedded pair, see [`Tableau`].
/// - `options`: tolerances, step bounds and budget, see [`Options`].
///
/// # Example
///
/// ```
/// use rkauto::prelude::*;
///
/// let mut f = Native::new(|_t: Float, y: &[Float], k: &Float, dydt: &mut [Float], _out: &mut [Float]| {
///     dydt[0] = -k * y[0];
/// });
/// let times = [0.0, 1.0, 2.0];
/// let sol = rk_auto(&mut f, &[1.0], &times, &1.0, &Tableau::rk45dp7(), &Options::default()).unwrap();
/// assert_eq!(sol.status(), Status::Success);
/// assert!((sol.state(0)[2] - (-2.0 as Float).exp()).abs() < 1e-5);
/// ```
pub fn rk_auto<F, P>(
    f: &mut F,
    y0: &[Float],
    times: &[Float],
    p: &P,
    method: &Tableau,
    options: &Options,
) -> Result<Solution, Vec<Error>>
where
    F: ODE<P> + ?Sized,
    P: ?Sized,
{
    // --- Input Validation ---
    check_inputs(y0, times, method, options)?;
    let b2 = match &method.b2 {
        Some(b2) => b2,
        None => return Err(vec![Error::MissingEmbeddedWeights(method.name)]),
    };

    f.init(p);

    // --- Declarations ---
    let n = y0.len();
    let stage = method.stage;
    let nout = f.nout();
    let rtol = &options.rtol;
    let atol = &options.atol;
    let level = if options.verbose {
        Level::Warn
    } else {
        Level::Debug
    };

    let t0 = times[0];
    let tlast = times[times.len() - 1];
    let tmax = options.tcrit.map_or(tlast, |tc| tc.max(tlast));
    let hmin = options.hmin;
    let hmax = options.hmax.map_or(tmax - t0, |h| h.min(tmax - t0));

    let mut ff = DMatrix::<Float>::zeros(n, stage);
    let mut dy1 = DVector::<Float>::zeros(n);
    let mut dy2 = DVector::<Float>::zeros(n);
    let mut y = y0.to_vec();
    let mut y1 = vec![0.0; n];
    let mut y2 = vec![0.0; n];
    let mut ytmp = vec![0.0; n];
    let mut out = vec![0.0; nout];

    let mut grid = OutputGrid::new(times, y0, nout);
    let mut dense = method.d.as_ref().map(|d| (DenseOutput::new(n), d));
    let mut knots = KnotBuffer::new(n);
    if !method.has_dense_output() {
        knots.push(t0, y0);
    }

    // --- Initializations ---
    let mut dt = match options.hini {
        Some(h) => h,
        None => {
            let mut f0 = vec![0.0; n];
            f.ode(t0, y0, p, &mut f0, &mut out);
            hinit(
                &*f, t0, y0, p, &f0, &mut y1, &mut ytmp, &mut out, method.qerr, hmax, atol, rtol,
            )
        }
    }
    .max(hmin)
    .min(hmax);

    let mut t = t0;
    let mut accept = false;
    let mut status = Status::Success;
    let mut nsteps = 0;
    let mut naccpt = 0;
    let mut nrejct = 0;

    // --- Main integration loop ---
    while t < tmax {
        // Reuse the last stage of the accepted step as the first stage.
        let j1 = if method.fsal && accept {
            let (first, rest) = ff.as_mut_slice().split_at_mut(n);
            first.copy_from_slice(&rest[(stage - 2) * n..]);
            1
        } else {
            0
        };

        // Stages
        for j in j1..stage {
            for i in 0..n {
                let mut fj: Float = 0.0;
                for k in 0..j {
                    fj += method.a[(j, k)] * ff[(i, k)] * dt;
                }
                ytmp[i] = y[i] + fj;
            }
            let column = &mut ff.as_mut_slice()[j * n..(j + 1) * n];
            f.ode(t + method.c[j] * dt, &ytmp, p, column, &mut out);
        }

        // Solution estimates
        advance(&y, dt, &ff, &method.b1, &mut dy1, &mut y1);
        advance(&y, dt, &ff, b2, &mut dy2, &mut y2);
        nsteps += 1;

        // Error control
        let err = scaled_error(&y1, &y2, atol, rtol);
        let decision = decide(err, dt, method.qerr, hmin, hmax);
        if decision.floored {
            status = Status::StepSizeBelowMin;
            log!(
                level,
                "step size below hmin = {hmin} at t = {t} (err = {err:.3e}), step forced"
            );
        }
        accept = decision.accept;

        if accept {
            naccpt += 1;
            let tnew = t + dt;
            match dense.as_mut() {
                Some((cont, d)) => {
                    cont.prepare(t, dt, &y, &y2, &ff, *d);
                    grid.fill_until(&*cont, tnew).map_err(|e| vec![e])?;
                }
                None => {
                    knots.push(tnew, &y2);
                    if knots.is_full() {
                        grid.fill_until(&knots, tnew).map_err(|e| vec![e])?;
                        knots.shift();
                    }
                }
            }
            t = tnew;
            std::mem::swap(&mut y, &mut y2);
        } else {
            nrejct += 1;
        }

        dt = decision.hnew.min(tmax - t);

        if nsteps > options.nmax {
            status = Status::NeedLargerNMax;
            log!(
                level,
                "maximum number of steps {} exceeded at t = {t}",
                options.nmax
            );
            break;
        }
    }

    // Rows reached before the knot window ever filled.
    if !method.has_dense_output() && knots.len() >= 2 {
        grid.fill_until(&knots, t).map_err(|e| vec![e])?;
    }

    let rows = grid.cursor();
    grid.fill_outputs(&*f, p);

    let diagnostics = Diagnostics {
        status,
        nsteps,
        naccpt,
        nrejct,
        nfev: nsteps * (stage - method.fsal_savings()),
        order: method.qerr,
    };
    let summary = if options.verbose {
        Level::Info
    } else {
        Level::Debug
    };
    log!(
        summary,
        "{}: {} steps ({} accepted, {} rejected), {} of {} output rows, t = {}",
        method.name,
        nsteps,
        naccpt,
        nrejct,
        rows,
        times.len(),
        t
    );

    Ok(Solution {
        yout: grid.into_matrix(),
        neq: n,
        nout,
        t,
        y,
        diagnostics,
    })
}

/// Collect every problem with the inputs of [`rk_auto`].
fn check_inputs(
    y0: &[Float],
    times: &[Float],
    method: &Tableau,
    options: &Options,
) -> Result<(), Vec<Error>> {
    let mut errors: Vec<Error> = Vec::new();
    let n = y0.len();

    if n == 0 {
        errors.push(Error::EmptyState);
    }

    if times.len() < 2 {
        errors.push(Error::TooFewTimes(times.len()));
    }
    if let Some(i) = (1..times.len()).find(|&i| !(times[i] > times[i - 1])) {
        errors.push(Error::TimesNotIncreasing {
            index: i,
            value: times[i],
            previous: times[i - 1],
        });
    }

    options.rtol.validate("rtol", n, &mut errors);
    options.atol.validate("atol", n, &mut errors);

    method.validate(&mut errors);

    let hmin = options.hmin;
    let hmax = options.hmax.unwrap_or(Float::INFINITY);
    if !(hmin >= 0.0) || !(hmax > 0.0) || hmin > hmax {
        errors.push(Error::InvalidStepBounds { hmin, hmax });
    }
    if let Some(h) = options.hini {
        if !(h > 0.0) {
            errors.push(Error::InvalidInitialStep(h));
        }
    }

    if options.nmax == 0 {
        errors.push(Error::NMaxMustBePositive(options.nmax));
    }

    if let (Some(tcrit), Some(&t0)) = (options.tcrit, times.first()) {
        if tcrit < t0 {
            errors.push(Error::TCritBeforeStart { tcrit, t0 });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode::Native;
    use approx::assert_relative_eq;

    fn decay() -> Native<impl Fn(Float, &[Float], &(), &mut [Float], &mut [Float])> {
        Native::new(|_t: Float, y: &[Float], _p: &(), dydt: &mut [Float], _o: &mut [Float]| {
            dydt[0] = -y[0];
        })
    }

    #[test]
    fn input_errors_are_collected() {
        let options = Options::builder()
            .rtol(vec![1e-6, 1e-6, 1e-6])
            .hmin(2.0)
            .hmax(1.0)
            .hini(-1.0)
            .nmax(0)
            .build();
        let errors = rk_auto(
            &mut decay(),
            &[1.0, 2.0],
            &[0.0, 1.0, 1.0],
            &(),
            &Tableau::rk45ck(),
            &options,
        )
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                Error::TimesNotIncreasing {
                    index: 2,
                    value: 1.0,
                    previous: 1.0
                },
                Error::ToleranceLength {
                    name: "rtol",
                    len: 3,
                    neq: 2
                },
                Error::InvalidStepBounds {
                    hmin: 2.0,
                    hmax: 1.0
                },
                Error::InvalidInitialStep(-1.0),
                Error::NMaxMustBePositive(0),
            ]
        );
    }

    #[test]
    fn single_output_time_is_rejected() {
        let errors = rk_auto(
            &mut decay(),
            &[1.0],
            &[0.0],
            &(),
            &Tableau::rk45dp7(),
            &Options::default(),
        )
        .unwrap_err();
        assert_eq!(errors, vec![Error::TooFewTimes(1)]);
    }

    #[test]
    fn tableau_without_embedded_weights_is_rejected() {
        let rk4 = Tableau::new(
            "rk4",
            &[&[], &[0.5], &[0.0, 0.5], &[0.0, 0.0, 1.0]],
            &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
            None,
            &[0.0, 0.5, 0.5, 1.0],
            None,
            4.0,
            false,
        );
        let errors = rk_auto(&mut decay(), &[1.0], &[0.0, 1.0], &(), &rk4, &Options::default())
            .unwrap_err();
        assert_eq!(errors, vec![Error::MissingEmbeddedWeights("rk4")]);
    }

    #[test]
    fn counts_evaluations_with_fsal_savings() {
        let sol = rk_auto(
            &mut decay(),
            &[1.0],
            &[0.0, 1.0],
            &(),
            &Tableau::rk45dp7(),
            &Options::default(),
        )
        .unwrap();
        let d = sol.diagnostics;
        assert_eq!(d.nsteps, d.naccpt + d.nrejct);
        assert_eq!(d.nfev, d.nsteps * 6);
        assert_eq!(d.order, 4.0);
        assert_relative_eq!(sol.t, 1.0);
    }

    #[test]
    fn tcrit_extends_the_horizon() {
        let options = Options::builder().tcrit(3.0).build();
        let sol = rk_auto(
            &mut decay(),
            &[1.0],
            &[0.0, 1.0],
            &(),
            &Tableau::rk45dp7(),
            &options,
        )
        .unwrap();
        assert_relative_eq!(sol.t, 3.0);
        assert_relative_eq!(sol.y[0], (-3.0 as Float).exp(), epsilon = 1e-5);
        assert_relative_eq!(sol.state(0)[1], (-1.0 as Float).exp(), epsilon = 1e-5);
    }

    #[test]
    fn init_hook_runs_once_before_stepping() {
        use std::cell::Cell;

        struct Scaled {
            rate: Cell<Float>,
            inits: usize,
        }

        impl ODE<Float> for Scaled {
            fn ode(&self, _t: Float, y: &[Float], _p: &Float, dydt: &mut [Float], _o: &mut [Float]) {
                dydt[0] = -self.rate.get() * y[0];
            }

            fn init(&mut self, p: &Float) {
                self.rate.set(*p);
                self.inits += 1;
            }
        }

        let mut model = Scaled {
            rate: Cell::new(0.0),
            inits: 0,
        };
        let sol = rk_auto(
            &mut model,
            &[1.0],
            &[0.0, 1.0],
            &2.0,
            &Tableau::rk45dp7(),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(model.inits, 1);
        assert_relative_eq!(sol.state(0)[1], (-2.0 as Float).exp(), epsilon = 1e-5);
    }
}
