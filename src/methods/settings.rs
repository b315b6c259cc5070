//! Settings for numerical integrators

use std::ops::Index;

use bon::Builder;

use crate::Float;

#[derive(Builder, Clone, Debug, Default)]
/// Settings for the numerical integrators
///
/// Every field is optional; `None` selects the method's own default.
pub struct Settings {
    /// The rounding unit, typically machine epsilon
    pub uround: Option<Float>,
    /// safety factor in step-size prediction.
    pub safety_factor: Option<Float>,
    /// Parameter for step size selection where scale_min <= hnew/hold <= scale_max
    pub scale_min: Option<Float>,
    /// Parameter for step size selection where scale_min <= hnew/hold <= scale_max
    pub scale_max: Option<Float>,
    /// Beta factor for stabilized step size control. Positive values of Beta
    /// ( <= 0.04 ) make the step size control more stable. Negative values
    /// are not accepted.
    pub beta: Option<Float>,
    /// Maximal step size.
    pub hmax: Option<Float>,
    /// Initial step size. None will result in an initial guess
    /// provided by the [`hinit`](super::hinit::hinit) function.
    pub h0: Option<Float>,
    /// Maximum number of allowed steps.
    pub nmax: Option<usize>,
    /// Number of steps before performing a stiffness test.
    pub nstiff: Option<usize>,
    /// Maximum number of Newton iterations per implicit step.
    pub newton_maxiter: Option<usize>,
    /// Stopping tolerance of the Newton iteration, relative to the
    /// error tolerances.
    pub newton_tol: Option<Float>,
}

/// Tolerance enum to allow scalar or vector tolerances
/// using [`Into`] trait for easy conversion from `Float`, `[Float; N]`, or `Vec<Float>`
/// users do not need to know or worry this simply allows both
/// `Float` and `[Float; N]` to be passed in as arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Tolerance {
    Scalar(Float),
    Vector(Vec<Float>),
}

impl Tolerance {
    /// Returns the first entry that is not a positive finite number.
    pub fn first_invalid(&self) -> Option<Float> {
        match self {
            Tolerance::Scalar(v) => (!(v.is_finite() && *v > 0.0)).then_some(*v),
            Tolerance::Vector(vs) => vs.iter().copied().find(|v| !(v.is_finite() && *v > 0.0)),
        }
    }

    /// Length of a vector tolerance that does not cover `n` components.
    pub fn len_mismatch(&self, n: usize) -> Option<usize> {
        match self {
            Tolerance::Scalar(_) => None,
            Tolerance::Vector(vs) => (vs.len() != n).then_some(vs.len()),
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
            Tolerance::Vector(vs) => &vs[index],
        }
    }
}
