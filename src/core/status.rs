//! Status codes for integrators

/// Termination status reported by an integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached `xend`.
    Success,
    /// A [`SolOut`](crate::core::solout::SolOut) callback asked to stop.
    UserInterrupt,
    /// The step budget `nmax` was exhausted before reaching `xend`.
    NeedLargerNMax,
    /// The step size fell below the rounding unit relative to `x`.
    StepSizeTooSmall,
    /// The stiffness test fired repeatedly.
    ProbablyStiff,
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::UserInterrupt => write!(f, "interrupted by callback"),
            Status::NeedLargerNMax => write!(f, "maximum number of steps exceeded"),
            Status::StepSizeTooSmall => write!(f, "step size became too small"),
            Status::ProbablyStiff => write!(f, "problem is probably stiff"),
        }
    }
}
