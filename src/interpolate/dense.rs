//! Continuous extension built from the stage derivatives of one step.

use nalgebra::{DMatrix, DVector};

use crate::Float;

use super::Interpolate;

/// Quartic local polynomial over the last accepted step `[told, told + h]`.
///
/// The coefficients are stored as five consecutive vectors of length `neq`
/// in `cont`; evaluate them with [`contd5`].
#[derive(Debug, Clone)]
pub struct DenseOutput {
    cont: Vec<Float>,
    told: Float,
    h: Float,
}

impl DenseOutput {
    pub fn new(neq: usize) -> Self {
        Self {
            cont: vec![0.0; 5 * neq],
            told: 0.0,
            h: 0.0,
        }
    }

    /// Build the coefficients for the step from `(told, y0)` to
    /// `(told + h, y1)` out of the stage derivative matrix `ff` and the
    /// tableau's dense-output weights `d`.
    ///
    /// The first column of `ff` must be the derivative at the start of the
    /// step and the last column the derivative at its end.
    pub fn prepare(
        &mut self,
        told: Float,
        h: Float,
        y0: &[Float],
        y1: &[Float],
        ff: &DMatrix<Float>,
        d: &DVector<Float>,
    ) {
        let n = y0.len();
        let last = ff.ncols() - 1;
        for i in 0..n {
            let ydiff = y1[i] - y0[i];
            let bspl = h * ff[(i, 0)] - ydiff;
            self.cont[i] = y0[i];
            self.cont[n + i] = ydiff;
            self.cont[2 * n + i] = bspl;
            self.cont[3 * n + i] = ydiff - h * ff[(i, last)] - bspl;
            let mut dsum: Float = 0.0;
            for (j, &dj) in d.iter().enumerate() {
                dsum += dj * ff[(i, j)];
            }
            self.cont[4 * n + i] = h * dsum;
        }
        self.told = told;
        self.h = h;
    }

    /// Time span `(told, told + h)` of the current step.
    pub fn span(&self) -> (Float, Float) {
        (self.told, self.told + self.h)
    }
}

impl Interpolate for DenseOutput {
    fn interpolate(&self, ti: Float, yi: &mut [Float]) {
        contd5(ti, yi, &self.cont, self.told, self.h);
    }
}

/// Evaluate the dense-output polynomial with coefficients `cont` at `ti`.
pub fn contd5(ti: Float, yi: &mut [Float], cont: &[Float], told: Float, h: Float) {
    let n = cont.len() / 5;
    let s = (ti - told) / h;
    let s1 = 1.0 - s;
    for i in 0..n {
        yi[i] = cont[i]
            + s * (cont[n + i]
                + s1 * (cont[2 * n + i] + s * (cont[3 * n + i] + s1 * cont[4 * n + i])));
    }
}
