//! The Van der Pol oscillator as a first-order system.
//!
//! The second-order equation
//!
//! ```text
//! x'' - eps * (1 - x^2) * x' + x = 0
//! ```
//!
//! becomes, with `y = x'`,
//!
//! ```text
//! dx/dt = y
//! dy/dt = -x + eps * (1 - x^2) * y
//! ```
//!
//! `eps = 0` is the linear harmonic oscillator, `eps > 0` damps or excites
//! trajectories onto a limit cycle, `eps < 0` makes that cycle repelling.

use crate::{Float, core::ode::ODE, matrix::Matrix};

/// Displacement `x` and velocity `y` of the oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    pub x: Float,
    pub y: Float,
}

impl State {
    pub const fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_array(self) -> [Float; 2] {
        [self.x, self.y]
    }
}

impl From<[Float; 2]> for State {
    fn from([x, y]: [Float; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(Float, Float)> for State {
    fn from((x, y): (Float, Float)) -> Self {
        Self { x, y }
    }
}

impl From<State> for [Float; 2] {
    fn from(s: State) -> Self {
        s.to_array()
    }
}

/// Van der Pol right-hand side for a fixed damping coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VanDerPol {
    pub eps: Float,
}

impl VanDerPol {
    pub const fn new(eps: Float) -> Self {
        Self { eps }
    }

    /// Time derivative of `state`. `_t` is ignored: the system is autonomous.
    pub fn field(&self, state: State, _t: Float) -> State {
        State {
            x: state.y,
            y: -state.x + self.eps * (1.0 - state.x * state.x) * state.y,
        }
    }
}

impl ODE for VanDerPol {
    fn ode(&self, x: Float, y: &[Float], dydx: &mut [Float]) {
        let d = self.field(State::new(y[0], y[1]), x);
        dydx[0] = d.x;
        dydx[1] = d.y;
    }

    fn jac(&self, _x: Float, y: &[Float], j: &mut Matrix) {
        let (x, v) = (y[0], y[1]);
        j[(0, 0)] = 0.0;
        j[(0, 1)] = 1.0;
        j[(1, 0)] = -1.0 - 2.0 * self.eps * x * v;
        j[(1, 1)] = self.eps * (1.0 - x * x);
    }
}

/// Returns the field function `(state, t) -> d(state)/dt` for damping `eps`.
///
/// ```
/// use vanderpol::prelude::*;
///
/// let field = build_field(5.0);
/// assert_eq!(field(State::new(0.0, 1.0), 1.0), State::new(1.0, 5.0));
/// ```
pub fn build_field(eps: Float) -> impl Fn(State, Float) -> State + Copy + Send + Sync {
    let vdp = VanDerPol::new(eps);
    move |state: State, t: Float| vdp.field(state, t)
}
