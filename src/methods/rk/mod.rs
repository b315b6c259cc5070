//! Explicit Runge-Kutta integrators

mod rk23;

pub use rk23::{contrk23, rk23};
