//! Numerical solution of the Van der Pol oscillator.
//!
//! The second-order equation `x'' - eps (1 - x^2) x' + x = 0` is rewritten
//! as a first-order system ([`oscillator`]) and integrated with an adaptive
//! embedded Runge-Kutta method ([`methods`]), switching to the implicit
//! Radau IIA method when large damping makes the system stiff.
//! [`solve`](solve::solve)
//! reports the state at exactly the requested time points using each step's
//! dense output. [`scenario`] holds the fixed demonstration batteries.
//!
//! ```
//! use vanderpol::prelude::*;
//!
//! let time = arange(0.0, 40.0, 0.1).unwrap();
//! let traj = solve(1.0, &[1.0, 1.0], &time).unwrap();
//! assert_eq!(traj.len(), time.len());
//! for (t, s) in traj.iter().take(3) {
//!     println!("t = {:.1}, x = {:.4}, dx/dt = {:.4}", t, s.x, s.y);
//! }
//! ```

pub mod core;
pub mod error;
pub mod grid;
pub mod matrix;
pub mod methods;
pub mod oscillator;
pub mod prelude;
pub mod scenario;
pub mod solve;

pub use error::{Error, ErrorKind};

// Prevent selecting two incompatible float precision features at once.
#[cfg(all(feature = "f32", feature = "f64"))]
compile_error!(
    "features 'f32' and 'f64' cannot both be enabled; pick exactly one Float precision feature"
);

#[cfg(not(any(feature = "f32", feature = "f64")))]
compile_error!("enable exactly one of the 'f32' or 'f64' features");

#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f64")]
pub type Float = f64;
