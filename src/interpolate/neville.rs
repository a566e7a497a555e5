//! Neville-Aitken interpolation over a sliding window of accepted states.

use crate::Float;

use super::Interpolate;

/// Capacity of the knot window: cubic interpolation.
pub const KNOTS: usize = 4;

/// Fixed-capacity window of `(time, state)` knots.
///
/// Knots are appended after each accepted step. Once the window is full the
/// caller interpolates, then calls [`KnotBuffer::shift`] to drop the oldest
/// knot and make room for the next one.
#[derive(Debug, Clone)]
pub struct KnotBuffer {
    neq: usize,
    len: usize,
    times: [Float; KNOTS],
    // knot-major: knot i occupies states[i * neq..(i + 1) * neq]
    states: Vec<Float>,
}

impl KnotBuffer {
    pub fn new(neq: usize) -> Self {
        Self {
            neq,
            len: 0,
            times: [0.0; KNOTS],
            states: vec![0.0; KNOTS * neq],
        }
    }

    /// Append a knot. The buffer must not be full.
    pub fn push(&mut self, t: Float, y: &[Float]) {
        debug_assert!(self.len < KNOTS, "knot buffer overflow");
        let i = self.len;
        self.times[i] = t;
        self.states[i * self.neq..(i + 1) * self.neq].copy_from_slice(y);
        self.len += 1;
    }

    /// Drop the oldest knot.
    pub fn shift(&mut self) {
        if self.len == 0 {
            return;
        }
        self.times.copy_within(1..self.len, 0);
        self.states.copy_within(self.neq..self.len * self.neq, 0);
        self.len -= 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == KNOTS
    }

    /// Times of the knots currently held, oldest first.
    pub fn times(&self) -> &[Float] {
        &self.times[..self.len]
    }
}

impl Interpolate for KnotBuffer {
    /// Interpolate every state component at `ti` with the polynomial through
    /// all knots currently held. Times are shifted to the oldest knot and
    /// scaled by the window width.
    fn interpolate(&self, ti: Float, yi: &mut [Float]) {
        let n = self.len;
        if n == 0 {
            return;
        }
        if n == 1 {
            yi.copy_from_slice(&self.states[..self.neq]);
            return;
        }
        let t0 = self.times[0];
        let tscal = self.times[n - 1] - t0;
        let mut x = [0.0; KNOTS];
        for i in 0..n {
            x[i] = (self.times[i] - t0) / tscal;
        }
        let t = (ti - t0) / tscal;

        let mut work = [0.0; KNOTS];
        for k in 0..self.neq {
            for i in 0..n {
                work[i] = self.states[i * self.neq + k];
            }
            yi[k] = neville(&x[..n], &mut work[..n], t);
        }
    }
}

/// Value at `t` of the polynomial through `(xs[i], ys[i])`, evaluated with
/// the Neville-Aitken recurrence. `ys` is overwritten as workspace.
pub fn neville(xs: &[Float], ys: &mut [Float], t: Float) -> Float {
    let n = xs.len();
    for j in 1..n {
        for i in (j..n).rev() {
            ys[i] = ((t - xs[i - j]) * ys[i] - (t - xs[i]) * ys[i - 1]) / (xs[i] - xs[i - j]);
        }
    }
    ys[n - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cubic(t: Float) -> Float {
        2.0 - t + 0.5 * t * t - 0.25 * t * t * t
    }

    #[test]
    fn neville_reproduces_cubics() {
        let xs = [0.0, 0.3, 1.1, 2.0];
        for &t in &[0.1, 0.7, 1.5, 2.0] {
            let mut ys = xs.map(cubic);
            assert_relative_eq!(neville(&xs, &mut ys, t), cubic(t), epsilon = 1e-13);
        }
    }

    #[test]
    fn buffer_interpolates_each_component() {
        let mut knots = KnotBuffer::new(2);
        for &t in &[10.0, 10.5, 11.25, 12.0] {
            knots.push(t, &[cubic(t - 10.0), 3.0 * t]);
        }
        assert!(knots.is_full());
        let mut yi = [0.0; 2];
        knots.interpolate(11.0, &mut yi);
        assert_relative_eq!(yi[0], cubic(1.0), epsilon = 1e-13);
        assert_relative_eq!(yi[1], 33.0, epsilon = 1e-13);

        // knots are reproduced up to rounding
        knots.interpolate(11.25, &mut yi);
        assert_relative_eq!(yi[1], 33.75, epsilon = 1e-13);
    }

    #[test]
    fn shift_drops_oldest_knot() {
        let mut knots = KnotBuffer::new(1);
        for (i, &t) in [0.0, 1.0, 2.0, 3.0].iter().enumerate() {
            knots.push(t, &[i as Float]);
        }
        knots.shift();
        assert_eq!(knots.len(), 3);
        assert_eq!(knots.times(), &[1.0, 2.0, 3.0]);
        knots.push(4.0, &[4.0]);
        assert!(knots.is_full());
        let mut yi = [0.0];
        knots.interpolate(1.0, &mut yi);
        assert_relative_eq!(yi[0], 1.0, epsilon = 1e-14);
        knots.interpolate(3.5, &mut yi);
        assert_relative_eq!(yi[0], 3.5, epsilon = 1e-13);
    }

    #[test]
    fn partial_buffer_uses_available_knots() {
        let mut knots = KnotBuffer::new(1);
        knots.push(0.0, &[1.0]);
        let mut yi = [0.0];
        knots.interpolate(5.0, &mut yi);
        assert_eq!(yi[0], 1.0);
        knots.push(2.0, &[3.0]);
        knots.interpolate(1.0, &mut yi);
        assert_relative_eq!(yi[0], 2.0, epsilon = 1e-15);
    }
}
