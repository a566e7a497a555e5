//! User-supplied ODE system.

use crate::Float;

/// User-supplied ODE system y' = f(t, y, p).
///
/// Implement this trait for your problem to provide the right-hand side. The
/// integrator calls `ode` with the current time `t`, state `y` and the
/// parameter object `p`, and expects `dydt` to be filled with the derivative
/// values. Models with auxiliary outputs report their count through `nout`
/// and fill `out` (of length `nout`) on every call.
///
/// `init` runs exactly once per integration call, before the first
/// evaluation, and may derive whatever the model needs from `p`.
///
/// # Example
///
/// ```
/// use rkauto::{Float, ODE};
///
/// struct Decay;
///
/// impl ODE<Float> for Decay {
///     fn ode(&self, _t: Float, y: &[Float], k: &Float, dydt: &mut [Float], _out: &mut [Float]) {
///         dydt[0] = -k * y[0];
///     }
/// }
/// ```
pub trait ODE<P: ?Sized = ()> {
    fn ode(&self, t: Float, y: &[Float], p: &P, dydt: &mut [Float], out: &mut [Float]);

    /// Number of auxiliary outputs written to `out`.
    fn nout(&self) -> usize {
        0
    }

    fn init(&mut self, _p: &P) {}
}

/// A native Rust closure used as the right-hand side.
///
/// The closure receives `(t, y, p, dydt, out)`, the same arguments as
/// [`ODE::ode`].
pub struct Native<F> {
    f: F,
    nout: usize,
}

impl<F> Native<F> {
    /// Wrap a closure without auxiliary outputs.
    pub fn new(f: F) -> Self {
        Self { f, nout: 0 }
    }

    /// Wrap a closure that also fills `nout` auxiliary outputs.
    pub fn with_outputs(f: F, nout: usize) -> Self {
        Self { f, nout }
    }
}

impl<F, P> ODE<P> for Native<F>
where
    P: ?Sized,
    F: Fn(Float, &[Float], &P, &mut [Float], &mut [Float]),
{
    #[inline]
    fn ode(&self, t: Float, y: &[Float], p: &P, dydt: &mut [Float], out: &mut [Float]) {
        (self.f)(t, y, p, dydt, out)
    }

    fn nout(&self) -> usize {
        self.nout
    }
}
