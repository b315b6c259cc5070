//! Radau IIA implicit Runge Kutta methods

mod radau5;

pub use radau5::{contr5, radau5};
