//! Interpolation trait for dense output

use crate::Float;

/// Trait for interpolating the solution within an accepted step.
pub trait Interpolate {
    /// Interpolate the solution at the given abscissa `xi`.
    fn interpolate(&self, xi: Float, yi: &mut [Float]);
}
