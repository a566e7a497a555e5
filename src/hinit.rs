//! Compute an initial step size guess

use crate::{Float, ode::ODE, tolerance::Tolerance};

/// Compute an initial step size guess for an explicit Runge-Kutta method of
/// order `iord`, following Hairer, Nørsett & Wanner.
///
/// `f0` must hold `f(t, y)`. `f1`, `y1` and `out` are scratch buffers.
pub fn hinit<F, P>(
    f: &F,
    t: Float,
    y: &[Float],
    p: &P,
    f0: &[Float],
    f1: &mut [Float],
    y1: &mut [Float],
    out: &mut [Float],
    iord: Float,
    hmax: Float,
    atol: &Tolerance,
    rtol: &Tolerance,
) -> Float
where
    F: ODE<P> + ?Sized,
    P: ?Sized,
{
    let n = y.len();
    let mut dnf: Float = 0.0;
    let mut dny: Float = 0.0;

    for i in 0..n {
        let sk = atol[i] + rtol[i] * y[i].abs();
        dnf += scaled(f0[i], sk).powi(2);
        dny += scaled(y[i], sk).powi(2);
    }

    let mut h: Float = if dnf <= 1e-10 || dny <= 1e-10 {
        1.0e-6
    } else {
        (dny / dnf).sqrt() * 0.01
    };
    h = h.min(hmax);

    // Explicit Euler step: y1 = y + h * f0
    for i in 0..n {
        y1[i] = y[i] + h * f0[i];
    }
    f.ode(t + h, y1, p, f1, out);

    // Estimate second derivative
    let mut der2: Float = 0.0;
    for i in 0..n {
        let sk = atol[i] + rtol[i] * y[i].abs();
        der2 += scaled(f1[i] - f0[i], sk).powi(2);
    }
    der2 = der2.sqrt() / h;

    let der12 = der2.abs().max(dnf.sqrt());
    let h1: Float = if der12 <= 1.0e-15 {
        (1.0e-6 as Float).max(h * 1.0e-3)
    } else {
        (0.01 / der12).powf(1.0 / iord)
    };

    (100.0 * h).min(h1).min(hmax)
}

/// `v / sk`, zero when `v` is zero so a zero scale never yields NaN.
fn scaled(v: Float, sk: Float) -> Float {
    if v == 0.0 { 0.0 } else { v / sk }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode::Native;

    #[test]
    fn guess_is_positive_and_bounded() {
        let f = Native::new(|_t: Float, y: &[Float], _p: &(), dydt: &mut [Float], _o: &mut [Float]| {
            dydt[0] = -y[0];
        });
        let y = [1.0];
        let f0 = [-1.0];
        let (mut f1, mut y1) = ([0.0], [0.0]);
        let tol = Tolerance::Scalar(1e-6);
        let h = hinit(&f, 0.0, &y, &(), &f0, &mut f1, &mut y1, &mut [], 4.0, 10.0, &tol, &tol);
        assert!(h > 0.0 && h < 1.0, "h = {h}");

        let capped = hinit(&f, 0.0, &y, &(), &f0, &mut f1, &mut y1, &mut [], 4.0, 1e-4, &tol, &tol);
        assert!(capped <= 1e-4);
    }

    #[test]
    fn zero_scale_on_constant_component_is_ignored() {
        let f = Native::new(|_t: Float, y: &[Float], _p: &(), dydt: &mut [Float], _o: &mut [Float]| {
            dydt[0] = -y[0];
            dydt[1] = 0.0;
        });
        let y = [1.0, 0.0];
        let f0 = [-1.0, 0.0];
        let (mut f1, mut y1) = ([0.0; 2], [0.0; 2]);
        let atol = Tolerance::Scalar(0.0);
        let rtol = Tolerance::Scalar(1e-6);
        let h = hinit(&f, 0.0, &y, &(), &f0, &mut f1, &mut y1, &mut [], 4.0, 10.0, &atol, &rtol);
        assert!(h.is_finite() && h > 0.0, "h = {h}");
    }

    #[test]
    fn constant_solution_uses_fallback() {
        let f = Native::new(|_t: Float, _y: &[Float], _p: &(), dydt: &mut [Float], _o: &mut [Float]| {
            dydt[0] = 0.0;
        });
        let (mut f1, mut y1) = ([0.0], [0.0]);
        let tol = Tolerance::Scalar(1e-6);
        let h = hinit(&f, 0.0, &[1.0], &(), &[0.0], &mut f1, &mut y1, &mut [], 4.0, 10.0, &tol, &tol);
        assert_eq!(h, 1.0e-6);
    }
}
