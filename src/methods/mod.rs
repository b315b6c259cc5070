//! Numerical integration methods

pub mod dp;
pub mod hinit;
pub mod radau;
pub mod result;
pub mod rk;
pub mod settings;
