//! Tolerance abstraction to allow scalar or vector tolerances

use std::ops::Index;

use crate::{Float, error::Error};

/// Tolerance enum to allow scalar or vector tolerances
/// using [`Into`] trait for easy conversion from `Float`, `[Float; N]`, `&[Float]`
/// or `Vec<Float>`. A vector of length 1 broadcasts like a scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum Tolerance {
    Scalar(Float),
    Vector(Vec<Float>),
}

impl Tolerance {
    /// Check that the tolerance fits a system of `neq` equations.
    pub(crate) fn validate(&self, name: &'static str, neq: usize, errors: &mut Vec<Error>) {
        let values: &[Float] = match self {
            Tolerance::Scalar(v) => std::slice::from_ref(v),
            Tolerance::Vector(vs) => {
                if vs.len() != 1 && vs.len() != neq {
                    errors.push(Error::ToleranceLength {
                        name,
                        len: vs.len(),
                        neq,
                    });
                }
                vs
            }
        };
        if let Some(&value) = values.iter().find(|v| !(**v >= 0.0)) {
            errors.push(Error::NegativeTolerance { name, value });
        }
    }
}

impl From<Float> for Tolerance {
    fn from(val: Float) -> Self {
        Tolerance::Scalar(val)
    }
}

impl From<&[Float]> for Tolerance {
    fn from(val: &[Float]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl<const N: usize> From<[Float; N]> for Tolerance {
    fn from(val: [Float; N]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl From<Vec<Float>> for Tolerance {
    fn from(val: Vec<Float>) -> Self {
        Tolerance::Vector(val)
    }
}

impl Index<usize> for Tolerance {
    type Output = Float;

    fn index(&self, index: usize) -> &Self::Output {
        match self {
            Tolerance::Scalar(v) => v,
            Tolerance::Vector(vs) if vs.len() == 1 => &vs[0],
            Tolerance::Vector(vs) => &vs[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcasts_scalar_and_singleton() {
        let s = Tolerance::from(1e-6);
        let one = Tolerance::from(vec![1e-3]);
        let v = Tolerance::from([1e-3, 1e-4]);
        assert_eq!(s[5], 1e-6);
        assert_eq!(one[7], 1e-3);
        assert_eq!(v[1], 1e-4);
    }

    #[test]
    fn rejects_wrong_length_and_negative_entries() {
        let mut errors = Vec::new();
        Tolerance::from(vec![1e-6, 1e-6, 1e-6]).validate("rtol", 2, &mut errors);
        Tolerance::from(-1.0).validate("atol", 2, &mut errors);
        assert_eq!(
            errors,
            vec![
                Error::ToleranceLength {
                    name: "rtol",
                    len: 3,
                    neq: 2
                },
                Error::NegativeTolerance {
                    name: "atol",
                    value: -1.0
                },
            ]
        );
    }
}
