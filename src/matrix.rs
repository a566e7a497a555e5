//! Dense products of the stage derivative matrix.

use nalgebra::{DMatrix, DVector};

use crate::Float;

/// `dy = ff * w` for the `neq x stage` stage derivative matrix `ff` and a
/// weight vector `w` of length `stage`.
///
/// No NaN scanning is done; inputs are assumed finite.
#[inline]
pub fn matprod(ff: &DMatrix<Float>, w: &DVector<Float>, dy: &mut DVector<Float>) {
    dy.gemv(1.0, ff, w, 0.0);
}

/// `y = y0 + h * (ff * w)`, writing into `y`.
pub fn advance(
    y0: &[Float],
    h: Float,
    ff: &DMatrix<Float>,
    w: &DVector<Float>,
    dy: &mut DVector<Float>,
    y: &mut [Float],
) {
    matprod(ff, w, dy);
    for ((yi, &y0i), &dyi) in y.iter_mut().zip(y0).zip(dy.iter()) {
        *yi = y0i + h * dyi;
    }
}
