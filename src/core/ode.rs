//! Right-hand side of a first-order ODE system.

use crate::{Float, matrix::Matrix};

/// Right-hand side of a first-order system `y' = f(x, y)`.
///
/// The integrators repeatedly call `ode` with the current abscissa `x` and
/// state `y` and expect `dydx` to be filled with the derivative values.
/// [`VanDerPol`](crate::oscillator::VanDerPol) is the implementation this
/// crate is built around.
///
/// # Example
///
/// ```
/// use vanderpol::prelude::*;
///
/// struct Harmonic;
///
/// impl ODE for Harmonic {
///     fn ode(&self, _x: Float, y: &[Float], dydx: &mut [Float]) {
///         dydx[0] = y[1];
///         dydx[1] = -y[0];
///     }
/// }
///
/// let mut dydx = [0.0; 2];
/// Harmonic.ode(0.0, &[1.0, 0.0], &mut dydx);
/// assert_eq!(dydx, [0.0, -1.0]);
/// ```
pub trait ODE {
    fn ode(&self, x: Float, y: &[Float], dydx: &mut [Float]);

    /// Jacobian `df/dy` at `(x, y)`, used by the implicit methods.
    ///
    /// The default approximates it by forward differences. Override it when
    /// the partial derivatives are known in closed form.
    fn jac(&self, x: Float, y: &[Float], j: &mut Matrix) {
        let n = y.len();
        let mut f0 = vec![0.0; n];
        let mut f1 = vec![0.0; n];
        let mut yp = y.to_vec();
        self.ode(x, y, &mut f0);
        for c in 0..n {
            let delt = (Float::EPSILON * y[c].abs().max(1e-5)).sqrt();
            yp[c] = y[c] + delt;
            self.ode(x, &yp, &mut f1);
            for r in 0..n {
                j[(r, c)] = (f1[r] - f0[r]) / delt;
            }
            yp[c] = y[c];
        }
    }
}
