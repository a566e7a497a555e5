#![allow(dead_code)]

use std::cell::RefCell;

use rkauto::prelude::*;

/// y' = -y
pub struct Decay;

impl ODE for Decay {
    fn ode(&self, _t: Float, y: &[Float], _p: &(), dydt: &mut [Float], _out: &mut [Float]) {
        for i in 0..y.len() {
            dydt[i] = -y[i];
        }
    }
}

/// y0' = y1, y1' = -y0 with y(0) = (0, 1): y = (sin t, cos t).
pub struct Oscillator;

impl ODE for Oscillator {
    fn ode(&self, _t: Float, y: &[Float], _p: &(), dydt: &mut [Float], _out: &mut [Float]) {
        dydt[0] = y[1];
        dydt[1] = -y[0];
    }
}

/// y' = -k (y - cos t), parameter k.
pub struct Relaxation;

impl ODE<Float> for Relaxation {
    fn ode(&self, t: Float, y: &[Float], k: &Float, dydt: &mut [Float], _out: &mut [Float]) {
        dydt[0] = -k * (y[0] - t.cos());
    }
}

/// Exact solution of [`Relaxation`] with k = 10 and y(0) = 0.
pub fn relaxation_exact(t: Float) -> Float {
    (100.0 * t.cos() + 10.0 * t.sin() - 100.0 * (-10.0 * t).exp()) / 101.0
}

/// y0' = -y0 next to a component frozen at its initial value.
pub struct DecayAndConstant;

impl ODE for DecayAndConstant {
    fn ode(&self, _t: Float, y: &[Float], _p: &(), dydt: &mut [Float], _out: &mut [Float]) {
        dydt[0] = -y[0];
        dydt[1] = 0.0;
    }
}

/// Decay that records the time of every evaluation.
#[derive(Default)]
pub struct RecordingDecay {
    pub calls: RefCell<Vec<Float>>,
}

impl ODE for RecordingDecay {
    fn ode(&self, t: Float, y: &[Float], _p: &(), dydt: &mut [Float], _out: &mut [Float]) {
        self.calls.borrow_mut().push(t);
        dydt[0] = -y[0];
    }
}

/// Decay with the energy `y^2` as auxiliary output.
pub struct DecayWithEnergy;

impl ODE for DecayWithEnergy {
    fn ode(&self, _t: Float, y: &[Float], _p: &(), dydt: &mut [Float], out: &mut [Float]) {
        dydt[0] = -y[0];
        out[0] = y[0] * y[0];
    }

    fn nout(&self) -> usize {
        1
    }
}

/// `n` equally spaced points from `t0` to `t1` inclusive.
pub fn grid(t0: Float, t1: Float, n: usize) -> Vec<Float> {
    (0..n)
        .map(|i| t0 + (t1 - t0) * i as Float / (n - 1) as Float)
        .collect()
}

pub fn catalogue() -> Vec<Tableau> {
    vec![
        Tableau::rk23(),
        Tableau::rk23bs(),
        Tableau::rk45f(),
        Tableau::rk45ck(),
        Tableau::rk45dp7(),
    ]
}
