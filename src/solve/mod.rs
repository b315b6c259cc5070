//! Trajectory solver: integrate the oscillator and sample it on a time grid.

mod integrate;
mod options;
mod sampler;
mod trajectory;

pub use integrate::{solve, solve_with};
pub use options::{Method, SolveOptions};
pub use trajectory::{Stats, Trajectory};
