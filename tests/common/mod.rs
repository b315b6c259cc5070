#![allow(dead_code)]

use vanderpol::prelude::*;

/// Tight tolerances for comparisons against closed-form solutions.
pub fn tight_opts(method: Method) -> SolveOptions {
    SolveOptions::builder()
        .method(method)
        .rtol(1e-10)
        .atol(1e-10)
        .build()
}

/// Closed-form solution of the eps = 0 oscillator.
pub fn harmonic(x0: Float, y0: Float, t: Float) -> State {
    State::new(x0 * t.cos() + y0 * t.sin(), -x0 * t.sin() + y0 * t.cos())
}

/// The 0..40 step 0.1 grid used by every scenario.
pub fn default_grid() -> Vec<Float> {
    arange(0.0, 40.0, 0.1).unwrap()
}
