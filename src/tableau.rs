//! Butcher tableaux of embedded explicit Runge-Kutta pairs.

use nalgebra::{DMatrix, DVector};

use crate::{Float, error::Error};

/// Method descriptor for an explicit embedded Runge-Kutta pair.
///
/// - `a`: `stage x stage` strictly lower triangular coefficient matrix.
/// - `b1`: weights of the first solution `y1`.
/// - `b2`: weights of the embedded solution `y2`, which is the solution
///   carried forward. Without it the tableau cannot drive error control.
/// - `c`: abscissae.
/// - `d`: optional dense-output weights. When present the integrator uses
///   the built-in continuous extension, otherwise Neville-Aitken
///   interpolation over the last accepted steps.
/// - `qerr`: order used in the step-size exponent `-1 / qerr`.
/// - `fsal`: last stage of an accepted step equals the first stage of the next.
#[derive(Clone, Debug)]
pub struct Tableau {
    pub name: &'static str,
    pub stage: usize,
    pub a: DMatrix<Float>,
    pub b1: DVector<Float>,
    pub b2: Option<DVector<Float>>,
    pub c: DVector<Float>,
    pub d: Option<DVector<Float>>,
    pub qerr: Float,
    pub fsal: bool,
}

impl Tableau {
    /// Build a tableau from its rows. `a` rows may be ragged: missing
    /// trailing entries are zero, so `&[&[], &[0.5]]` is a valid 2-stage `A`.
    /// Dimensions are checked by [`Tableau::validate`], which the integrator
    /// runs before stepping.
    pub fn new(
        name: &'static str,
        a: &[&[Float]],
        b1: &[Float],
        b2: Option<&[Float]>,
        c: &[Float],
        d: Option<&[Float]>,
        qerr: Float,
        fsal: bool,
    ) -> Self {
        let stage = c.len();
        let ncols = a.iter().map(|row| row.len()).max().unwrap_or(0).max(stage);
        let mut am = DMatrix::<Float>::zeros(a.len(), ncols);
        for (j, row) in a.iter().enumerate() {
            for (k, &v) in row.iter().enumerate() {
                am[(j, k)] = v;
            }
        }
        Self {
            name,
            stage,
            a: am,
            b1: DVector::from_column_slice(b1),
            b2: b2.map(DVector::from_column_slice),
            c: DVector::from_column_slice(c),
            d: d.map(DVector::from_column_slice),
            qerr,
            fsal,
        }
    }

    /// `true` if the tableau carries dense-output weights.
    pub fn has_dense_output(&self) -> bool {
        self.d.is_some()
    }

    /// Derivative evaluations saved per step by FSAL reuse.
    pub fn fsal_savings(&self) -> usize {
        usize::from(self.fsal)
    }

    /// Check the tableau for use with adaptive step-size control.
    pub fn validate(&self, errors: &mut Vec<Error>) {
        let stage = self.stage;
        if stage == 0 {
            errors.push(Error::TableauDimension {
                field: "c",
                expected: 1,
                found: 0,
            });
            return;
        }
        let dim = |field: &'static str, found: usize, errors: &mut Vec<Error>| {
            if found != stage {
                errors.push(Error::TableauDimension {
                    field,
                    expected: stage,
                    found,
                });
            }
        };
        dim("A rows", self.a.nrows(), errors);
        dim("A columns", self.a.ncols(), errors);
        dim("b1", self.b1.len(), errors);
        match &self.b2 {
            Some(b2) => dim("b2", b2.len(), errors),
            None => errors.push(Error::MissingEmbeddedWeights(self.name)),
        }
        if let Some(d) = &self.d {
            dim("d", d.len(), errors);
        }
        if self.fsal && stage < 2 {
            errors.push(Error::TableauDimension {
                field: "c (FSAL)",
                expected: 2,
                found: stage,
            });
        }
        for j in 0..self.a.nrows() {
            for k in j..self.a.ncols() {
                if self.a[(j, k)] != 0.0 {
                    errors.push(Error::NotExplicit {
                        row: j,
                        col: k,
                        value: self.a[(j, k)],
                    });
                }
            }
        }
        if !(self.qerr > 0.0) {
            errors.push(Error::InvalidOrder(self.qerr));
        }
    }

    /// Kutta's 3rd order method with the explicit midpoint rule embedded.
    pub fn rk23() -> Self {
        Self::new(
            "rk23",
            &[&[], &[1.0 / 2.0], &[-1.0, 2.0]],
            &[0.0, 1.0, 0.0],
            Some(&[1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0]),
            &[0.0, 1.0 / 2.0, 1.0],
            None,
            2.0,
            false,
        )
    }

    /// Bogacki–Shampine 3(2) pair.
    pub fn rk23bs() -> Self {
        Self::new(
            "rk23bs",
            &[
                &[],
                &[1.0 / 2.0],
                &[0.0, 3.0 / 4.0],
                &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
            ],
            &[7.0 / 24.0, 1.0 / 4.0, 1.0 / 3.0, 1.0 / 8.0],
            Some(&[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0, 0.0]),
            &[0.0, 1.0 / 2.0, 3.0 / 4.0, 1.0],
            None,
            2.0,
            true,
        )
    }

    /// Runge-Kutta-Fehlberg 4(5) pair.
    pub fn rk45f() -> Self {
        Self::new(
            "rk45f",
            &[
                &[],
                &[1.0 / 4.0],
                &[3.0 / 32.0, 9.0 / 32.0],
                &[1932.0 / 2197.0, -7200.0 / 2197.0, 7296.0 / 2197.0],
                &[439.0 / 216.0, -8.0, 3680.0 / 513.0, -845.0 / 4104.0],
                &[-8.0 / 27.0, 2.0, -3544.0 / 2565.0, 1859.0 / 4104.0, -11.0 / 40.0],
            ],
            &[25.0 / 216.0, 0.0, 1408.0 / 2565.0, 2197.0 / 4104.0, -1.0 / 5.0, 0.0],
            Some(&[
                16.0 / 135.0,
                0.0,
                6656.0 / 12825.0,
                28561.0 / 56430.0,
                -9.0 / 50.0,
                2.0 / 55.0,
            ]),
            &[0.0, 1.0 / 4.0, 3.0 / 8.0, 12.0 / 13.0, 1.0, 1.0 / 2.0],
            None,
            4.0,
            false,
        )
    }

    /// Cash-Karp 4(5) pair.
    pub fn rk45ck() -> Self {
        Self::new(
            "rk45ck",
            &[
                &[],
                &[1.0 / 5.0],
                &[3.0 / 40.0, 9.0 / 40.0],
                &[3.0 / 10.0, -9.0 / 10.0, 6.0 / 5.0],
                &[-11.0 / 54.0, 5.0 / 2.0, -70.0 / 27.0, 35.0 / 27.0],
                &[
                    1631.0 / 55296.0,
                    175.0 / 512.0,
                    575.0 / 13824.0,
                    44275.0 / 110592.0,
                    253.0 / 4096.0,
                ],
            ],
            &[
                2825.0 / 27648.0,
                0.0,
                18575.0 / 48384.0,
                13525.0 / 55296.0,
                277.0 / 14336.0,
                1.0 / 4.0,
            ],
            Some(&[
                37.0 / 378.0,
                0.0,
                250.0 / 621.0,
                125.0 / 594.0,
                0.0,
                512.0 / 1771.0,
            ]),
            &[0.0, 1.0 / 5.0, 3.0 / 10.0, 3.0 / 5.0, 1.0, 7.0 / 8.0],
            None,
            4.0,
            false,
        )
    }

    /// Dormand–Prince 5(4) pair with its 4th order continuous extension.
    pub fn rk45dp7() -> Self {
        Self::new(
            "rk45dp7",
            &[
                &[],
                &[A21],
                &[A31, A32],
                &[A41, A42, A43],
                &[A51, A52, A53, A54],
                &[A61, A62, A63, A64, A65],
                &[A71, 0.0, A73, A74, A75, A76],
            ],
            &[
                5179.0 / 57600.0,
                0.0,
                7571.0 / 16695.0,
                393.0 / 640.0,
                -92097.0 / 339200.0,
                187.0 / 2100.0,
                1.0 / 40.0,
            ],
            Some(&[A71, 0.0, A73, A74, A75, A76, 0.0]),
            &[0.0, C2, C3, C4, C5, 1.0, 1.0],
            Some(&[D1, 0.0, D3, D4, D5, D6, D7]),
            4.0,
            true,
        )
    }

    /// Look up a built-in tableau by its name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "rk23" => Some(Self::rk23()),
            "rk23bs" => Some(Self::rk23bs()),
            "rk45f" => Some(Self::rk45f()),
            "rk45ck" => Some(Self::rk45ck()),
            "rk45dp7" => Some(Self::rk45dp7()),
            _ => None,
        }
    }
}

impl Default for Tableau {
    fn default() -> Self {
        Tableau::rk45dp7()
    }
}

// DOPRI5 Butcher tableau coefficients
const C2: Float = 0.2;
const C3: Float = 0.3;
const C4: Float = 0.8;
const C5: Float = 8.0 / 9.0;

const A21: Float = 0.2;
const A31: Float = 3.0 / 40.0;
const A32: Float = 9.0 / 40.0;
const A41: Float = 44.0 / 45.0;
const A42: Float = -56.0 / 15.0;
const A43: Float = 32.0 / 9.0;
const A51: Float = 19372.0 / 6561.0;
const A52: Float = -25360.0 / 2187.0;
const A53: Float = 64448.0 / 6561.0;
const A54: Float = -212.0 / 729.0;
const A61: Float = 9017.0 / 3168.0;
const A62: Float = -355.0 / 33.0;
const A63: Float = 46732.0 / 5247.0;
const A64: Float = 49.0 / 176.0;
const A65: Float = -5103.0 / 18656.0;
const A71: Float = 35.0 / 384.0;
const A73: Float = 500.0 / 1113.0;
const A74: Float = 125.0 / 192.0;
const A75: Float = -2187.0 / 6784.0;
const A76: Float = 11.0 / 84.0;

const D1: Float = -12715105075.0 / 11282082432.0;
const D3: Float = 87487479700.0 / 32700410799.0;
const D4: Float = -10690763975.0 / 1880347072.0;
const D5: Float = 701980252875.0 / 199316789632.0;
const D6: Float = -1453857185.0 / 822651844.0;
const D7: Float = 69997945.0 / 29380423.0;
