//! Options and method selection for the trajectory solver

use bon::Builder;

use crate::{
    Float,
    methods::settings::{Settings, Tolerance},
};

/// Integration method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    /// Bogacki–Shampine 3(2) adaptive RK
    RK23,
    /// Dormand–Prince 5(4) adaptive RK. Switches to [`Method::Radau`] when
    /// the problem turns out to be stiff.
    #[default]
    RK45,
    /// Radau IIA order 5 implicit RK, for stiff problems (large `eps`)
    Radau,
}

#[derive(Builder, Clone, Debug)]
/// Options for [`solve_with`](super::solve_with).
pub struct SolveOptions {
    /// Method to use. Default: RK45 (Dormand–Prince 5(4)).
    #[builder(default = Method::RK45)]
    pub method: Method,
    /// Relative tolerance for error estimation.
    #[builder(default = Tolerance::Scalar(1e-6), into)]
    pub rtol: Tolerance,
    /// Absolute tolerance for error estimation.
    #[builder(default = Tolerance::Scalar(1e-6), into)]
    pub atol: Tolerance,
    /// Initial step suggestion. Estimated when unset.
    pub first_step: Option<Float>,
    /// Maximum step size. Defaults to the grid span.
    pub max_step: Option<Float>,
    /// Maximum number of integration steps.
    pub nmax: Option<usize>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SolveOptions {
    pub(crate) fn settings(&self) -> Settings {
        Settings::builder()
            .maybe_h0(self.first_step)
            .maybe_hmax(self.max_step)
            .maybe_nmax(self.nmax)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = SolveOptions::default();
        assert_eq!(opts.method, Method::RK45);
        assert_eq!(opts.rtol, Tolerance::Scalar(1e-6));
        assert_eq!(opts.atol, Tolerance::Scalar(1e-6));
        assert!(opts.settings().nmax.is_none());
    }

    #[test]
    fn step_options_map_to_settings() {
        let opts = SolveOptions::builder()
            .method(Method::RK23)
            .rtol(1e-9)
            .first_step(0.01)
            .max_step(0.5)
            .nmax(10)
            .build();
        let settings = opts.settings();
        assert_eq!(settings.h0, Some(0.01));
        assert_eq!(settings.hmax, Some(0.5));
        assert_eq!(settings.nmax, Some(10));
        assert_eq!(opts.rtol, Tolerance::Scalar(1e-9));
    }

    #[test]
    fn stiff_method_is_selectable() {
        let opts = SolveOptions::builder().method(Method::Radau).build();
        assert_eq!(opts.method, Method::Radau);
        assert_eq!(opts.settings().newton_maxiter, None);
    }
}
