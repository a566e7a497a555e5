//! Python bindings.
//!
//! Exposes `rkauto.rk_auto(fun, y0, times, ...)`, where `fun(t, y, *args)`
//! returns the derivative, or `(derivative, outputs)` when `nout > 0`.

#[cfg(feature = "python")]
use std::cell::RefCell;

#[cfg(feature = "python")]
use numpy::{PyArray1, PyArrayMethods, PyReadonlyArray1};
#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::{PyDict, PyTuple};

#[cfg(feature = "python")]
use crate::{Float, ODE, Options, Tableau, Tolerance, rk_auto};

/// [`ODE`] implementation for a Python callable.
///
/// The trait cannot fail, so the first exception raised by the callable is
/// kept and every later evaluation returns NaN. Retrieve it with
/// [`PyODE::take_error`] once the integration has returned.
#[cfg(feature = "python")]
pub struct PyODE<'py> {
    fun: Bound<'py, PyAny>,
    args: Option<Bound<'py, PyTuple>>,
    nout: usize,
    py: Python<'py>,
    error: RefCell<Option<PyErr>>,
}

#[cfg(feature = "python")]
impl<'py> PyODE<'py> {
    pub fn new(
        fun: Bound<'py, PyAny>,
        args: Option<Bound<'py, PyTuple>>,
        nout: usize,
        py: Python<'py>,
    ) -> Self {
        Self {
            fun,
            args,
            nout,
            py,
            error: RefCell::new(None),
        }
    }

    pub fn take_error(&self) -> Option<PyErr> {
        self.error.borrow_mut().take()
    }

    /// Call `fun(t, y, *args)`.
    fn call(&self, t: Float, y: &[Float]) -> PyResult<Bound<'py, PyAny>> {
        let mut call_args = vec![
            t.into_pyobject(self.py)?.into_any(),
            PyArray1::from_slice(self.py, y).into_any(),
        ];
        if let Some(extra) = &self.args {
            call_args.extend(extra.iter());
        }
        self.fun.call1(PyTuple::new(self.py, call_args)?)
    }

    fn evaluate(&self, t: Float, y: &[Float], dydt: &mut [Float], out: &mut [Float]) -> PyResult<()> {
        let result = self.call(t, y)?;
        if self.nout == 0 {
            return copy_into(&result, dydt, "derivative");
        }
        let pair = result.cast::<PyTuple>().map_err(|_| {
            pyo3::exceptions::PyTypeError::new_err(
                "fun must return (derivative, outputs) when nout > 0",
            )
        })?;
        if pair.len() != 2 {
            return Err(pyo3::exceptions::PyTypeError::new_err(
                "fun must return (derivative, outputs) when nout > 0",
            ));
        }
        copy_into(&pair.get_item(0)?, dydt, "derivative")?;
        copy_into(&pair.get_item(1)?, out, "outputs")
    }
}

#[cfg(feature = "python")]
impl<'py> ODE for PyODE<'py> {
    fn ode(&self, t: Float, y: &[Float], _p: &(), dydt: &mut [Float], out: &mut [Float]) {
        if self.error.borrow().is_some() {
            dydt.fill(Float::NAN);
            out.fill(Float::NAN);
            return;
        }
        if let Err(e) = self.evaluate(t, y, dydt, out) {
            dydt.fill(Float::NAN);
            out.fill(Float::NAN);
            *self.error.borrow_mut() = Some(e);
        }
    }

    fn nout(&self) -> usize {
        self.nout
    }
}

/// Copy an array_like of matching length into `dst`.
#[cfg(feature = "python")]
fn copy_into(obj: &Bound<'_, PyAny>, dst: &mut [Float], what: &str) -> PyResult<()> {
    let values: Vec<Float> = if let Ok(arr) = obj.extract::<PyReadonlyArray1<Float>>() {
        arr.as_slice()?.to_vec()
    } else {
        obj.extract::<Vec<Float>>()?
    };
    if values.len() != dst.len() {
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "{what} has length {}, expected {}",
            values.len(),
            dst.len()
        )));
    }
    dst.copy_from_slice(&values);
    Ok(())
}

/// Float or array_like tolerance.
#[cfg(feature = "python")]
fn tolerance(obj: Option<Bound<'_, PyAny>>) -> PyResult<Option<Tolerance>> {
    match obj {
        None => Ok(None),
        Some(obj) => match obj.extract::<Float>() {
            Ok(v) => Ok(Some(Tolerance::Scalar(v))),
            Err(_) => Ok(Some(Tolerance::Vector(obj.extract::<Vec<Float>>()?))),
        },
    }
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "rk_auto")]
#[pyo3(signature = (fun, y0, times, method="rk45dp7", args=None, rtol=None, atol=None, tcrit=None, hmin=0.0, hmax=None, hini=None, nmax=5000, nout=0, verbose=false))]
/// Integrate ``dy/dt = fun(t, y, *args)`` and report the solution at ``times``.
///
/// Parameters
/// ----------
/// fun : callable
///     Right-hand side ``fun(t, y, *args)``. Returns the derivative, or the
///     pair ``(derivative, outputs)`` when ``nout > 0``.
/// y0 : array_like, shape (n,)
///     Initial state at ``times[0]``.
/// times : array_like
///     Strictly increasing output times.
/// method : str, optional
///     One of 'rk23', 'rk23bs', 'rk45f', 'rk45ck', 'rk45dp7' (default).
/// args : tuple, optional
///     Extra arguments passed to ``fun``.
/// rtol, atol : float or array_like, optional
///     Relative and absolute tolerances. Default 1e-6.
/// tcrit : float, optional
///     Integrate up to ``max(times[-1], tcrit)``.
/// hmin, hmax, hini : float, optional
///     Minimum, maximum and initial step size.
/// nmax : int, optional
///     Maximum number of steps. Default 5000.
/// nout : int, optional
///     Number of auxiliary outputs returned by ``fun``.
/// verbose : bool, optional
///     Log step-size and budget warnings at warn level.
///
/// Returns
/// -------
/// dict with ``yout`` (rows of time, states and outputs; NaN where not
/// reached), ``istate``, ``status``, ``message``, ``completed`` (every
/// output row filled), ``t`` and ``y``.
fn rk_auto_py<'py>(
    py: Python<'py>,
    fun: Bound<'py, PyAny>,
    y0: Vec<Float>,
    times: Vec<Float>,
    method: &str,
    args: Option<Bound<'py, PyTuple>>,
    rtol: Option<Bound<'py, PyAny>>,
    atol: Option<Bound<'py, PyAny>>,
    tcrit: Option<Float>,
    hmin: Float,
    hmax: Option<Float>,
    hini: Option<Float>,
    nmax: usize,
    nout: usize,
    verbose: bool,
) -> PyResult<Bound<'py, PyDict>> {
    let tableau = Tableau::by_name(method).ok_or_else(|| {
        pyo3::exceptions::PyValueError::new_err(format!("unknown method '{method}'"))
    })?;
    let options = Options::builder()
        .maybe_rtol(tolerance(rtol)?)
        .maybe_atol(tolerance(atol)?)
        .maybe_tcrit(tcrit)
        .hmin(hmin)
        .maybe_hmax(hmax)
        .maybe_hini(hini)
        .nmax(nmax)
        .verbose(verbose)
        .build();

    let mut model = PyODE::new(fun, args, nout, py);
    let result = rk_auto(&mut model, &y0, &times, &(), &tableau, &options);
    if let Some(e) = model.take_error() {
        return Err(e);
    }
    let sol = result.map_err(|errors| {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        pyo3::exceptions::PyValueError::new_err(msg)
    })?;

    let (rows, cols) = sol.yout.shape();
    let flat = sol.yout.transpose().as_slice().to_vec();
    let yout = PyArray1::from_vec(py, flat).reshape((rows, cols))?;

    let dict = PyDict::new(py);
    dict.set_item("yout", yout)?;
    dict.set_item("istate", sol.diagnostics.istate().to_vec())?;
    dict.set_item("status", sol.status().code())?;
    dict.set_item("message", format!("{:?}", sol.status()))?;
    dict.set_item("completed", sol.status().completed())?;
    dict.set_item("t", sol.t)?;
    dict.set_item("y", PyArray1::from_vec(py, sol.y))?;
    Ok(dict)
}

#[cfg(feature = "python")]
#[pymodule]
fn rkauto(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(rk_auto_py, m)?)?;
    m.add(
        "__doc__",
        "Adaptive embedded Runge-Kutta integration over a fixed output grid.",
    )?;
    Ok(())
}
