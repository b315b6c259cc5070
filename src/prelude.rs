//! Convenient prelude: import the most commonly used traits, types, and functions.
//!
//! Bring this into scope with:
//!
//! ```rust
//! use vanderpol::prelude::*;
//! ```
//!
//! Re-exports included:
//! - The `Float` precision alias.
//! - Core traits and types: `ODE`, `Interpolate`, `SolOut`, `ControlFlag`, `Status`.
//! - The oscillator: `State`, `VanDerPol`, `build_field`.
//! - High-level API: `solve`, `solve_with`, `SolveOptions`, `Method`, `Trajectory`.
//! - Time grids and scenarios: `arange`, `linspace`, `Scenario`, `ScenarioGroup`.
//!

pub use crate::Float;
pub use crate::core::{
    interpolate::Interpolate,
    ode::ODE,
    solout::{ControlFlag, SolOut},
    status::Status,
};
pub use crate::error::{Error, ErrorKind};
pub use crate::grid::{arange, linspace};
pub use crate::oscillator::{State, VanDerPol, build_field};
pub use crate::scenario::{Scenario, ScenarioGroup};
pub use crate::solve::{Method, SolveOptions, Stats, Trajectory, solve, solve_with};
