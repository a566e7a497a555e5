//! Output matrix assembly and run diagnostics.

use nalgebra::{DMatrix, DMatrixView};

use crate::{Float, error::Error, interpolate::Interpolate, ode::ODE, status::Status};

/// Counters and terminal status of one integration run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub status: Status,
    /// Step attempts, accepted and rejected.
    pub nsteps: usize,
    pub naccpt: usize,
    pub nrejct: usize,
    /// Derivative evaluations charged to the stepping loop:
    /// `nsteps * (stage - FSAL)`.
    pub nfev: usize,
    /// Order of the method (`Qerr` of the tableau).
    pub order: Float,
}

impl Diagnostics {
    /// Length of the vector returned by [`Diagnostics::istate`].
    pub const ISTATE_LEN: usize = 22;

    /// Integer state vector in the layout used by the classical multistep
    /// solvers: `[0]` status code, `[12]` steps, `[13]` function
    /// evaluations, `[15]` method order. Every other slot is zero.
    pub fn istate(&self) -> [i32; Self::ISTATE_LEN] {
        let mut istate = [0; Self::ISTATE_LEN];
        istate[0] = self.status.code();
        istate[12] = self.nsteps as i32;
        istate[13] = self.nfev as i32;
        istate[15] = self.order as i32;
        istate
    }
}

/// Result of [`crate::rk_auto`].
///
/// `yout` has one row per requested output time and `1 + neq + nout`
/// columns: time, states, auxiliary outputs. Rows the integrator never
/// reached hold NaN.
#[derive(Debug, Clone)]
pub struct Solution {
    pub yout: DMatrix<Float>,
    pub neq: usize,
    pub nout: usize,
    /// Final internal time.
    pub t: Float,
    /// State at the final internal time.
    pub y: Vec<Float>,
    pub diagnostics: Diagnostics,
}

impl Solution {
    pub fn status(&self) -> Status {
        self.diagnostics.status
    }

    pub fn nrows(&self) -> usize {
        self.yout.nrows()
    }

    /// Output times column.
    pub fn times(&self) -> Vec<Float> {
        self.yout.column(0).iter().copied().collect()
    }

    /// Trajectory of state component `i`.
    pub fn state(&self, i: usize) -> Vec<Float> {
        self.yout.column(1 + i).iter().copied().collect()
    }

    /// Trajectory of auxiliary output `k`.
    pub fn output(&self, k: usize) -> Vec<Float> {
        self.yout.column(1 + self.neq + k).iter().copied().collect()
    }

    /// All state columns.
    pub fn states(&self) -> DMatrixView<'_, Float> {
        self.yout.columns(1, self.neq)
    }

    /// Row `r` as `(time, states, outputs)`.
    pub fn row(&self, r: usize) -> (Float, Vec<Float>, Vec<Float>) {
        let row = self.yout.row(r);
        let t = row[0];
        let y = (0..self.neq).map(|i| row[1 + i]).collect();
        let out = (0..self.nout).map(|k| row[1 + self.neq + k]).collect();
        (t, y, out)
    }

    /// Number of leading rows that were reached by the integrator.
    pub fn reached(&self) -> usize {
        self.yout
            .column(0)
            .iter()
            .take_while(|t| !t.is_nan())
            .count()
    }
}

/// Output grid being filled left to right while the integrator advances.
pub(crate) struct OutputGrid<'a> {
    times: &'a [Float],
    neq: usize,
    nout: usize,
    yout: DMatrix<Float>,
    cursor: usize,
    scratch: Vec<Float>,
}

impl<'a> OutputGrid<'a> {
    /// Allocate the NaN-filled matrix and store the initial state in row 0.
    pub fn new(times: &'a [Float], y0: &[Float], nout: usize) -> Self {
        let neq = y0.len();
        let mut yout = DMatrix::from_element(times.len(), 1 + neq + nout, Float::NAN);
        yout[(0, 0)] = times[0];
        for (i, &yi) in y0.iter().enumerate() {
            yout[(0, 1 + i)] = yi;
        }
        Self {
            times,
            neq,
            nout,
            yout,
            cursor: 1,
            scratch: vec![0.0; neq],
        }
    }

    /// Index of the next output row to be filled.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Time of the next output row, if any is left.
    pub fn pending(&self) -> Option<Float> {
        self.times.get(self.cursor).copied()
    }

    /// Fill every pending row whose time is `<= upto` from `interp`.
    pub fn fill_until<I: Interpolate>(&mut self, interp: &I, upto: Float) -> Result<(), Error> {
        while let Some(t_ext) = self.pending() {
            if t_ext > upto {
                break;
            }
            interp.interpolate(t_ext, &mut self.scratch);
            let row = self.cursor;
            self.yout[(row, 0)] = t_ext;
            for (i, &yi) in self.scratch.iter().enumerate() {
                self.yout[(row, 1 + i)] = yi;
            }
            self.cursor += 1;
        }
        if self.cursor > self.times.len() {
            return Err(Error::OutputOverrun {
                cursor: self.cursor,
                rows: self.times.len(),
            });
        }
        Ok(())
    }

    /// Recompute the auxiliary outputs at every reached row.
    pub fn fill_outputs<F, P>(&mut self, f: &F, p: &P)
    where
        F: ODE<P> + ?Sized,
        P: ?Sized,
    {
        if self.nout == 0 {
            return;
        }
        let mut y = vec![0.0; self.neq];
        let mut dydt = vec![0.0; self.neq];
        let mut out = vec![0.0; self.nout];
        for row in 0..self.cursor {
            let t = self.yout[(row, 0)];
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = self.yout[(row, 1 + i)];
            }
            f.ode(t, &y, p, &mut dydt, &mut out);
            for (k, &ok) in out.iter().enumerate() {
                self.yout[(row, 1 + self.neq + k)] = ok;
            }
        }
    }

    pub fn into_matrix(self) -> DMatrix<Float> {
        self.yout
    }
}
