//! Errors returned by the solver and the integration methods

use crate::{Float, core::status::Status};

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed arguments supplied by the caller. Correct the request.
    InvalidInput,
    /// The numerical method could not produce a valid trajectory.
    Integration,
}

/// Errors returned by [`solve`](crate::solve::solve) and the integrators.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The time grid has no entries.
    EmptyTimeGrid,
    /// The time grid contains a NaN or infinite value.
    NonFiniteTimeGrid { index: usize, value: Float },
    /// `time[index] <= time[index - 1]`.
    NonMonotonicTimeGrid { index: usize, prev: Float, next: Float },
    /// The initial state does not have the expected number of components.
    StateDimension { expected: usize, got: usize },
    /// The initial state contains a NaN or infinite value.
    NonFiniteInitialState,
    /// `rtol` or `atol` is not a positive finite number.
    InvalidTolerance(Float),
    /// A vector tolerance does not have one entry per state component.
    ToleranceDimension { expected: usize, got: usize },
    NMaxMustBePositive(usize),
    NStiffMustBePositive(usize),
    NewtonMaxIterMustBePositive(usize),
    /// `newton_tol` is not in `(uround, 1)`.
    NewtonTolOutOfRange(Float),
    /// A step size bound is zero, negative or non-finite.
    InvalidStepSize(Float),
    URoundOutOfRange(Float),
    SafetyFactorOutOfRange(Float),
    InvalidScaleFactors(Float, Float),
    BetaTooLarge(Float),
    /// Several settings errors reported at once by an integrator.
    InvalidSettings(Vec<Error>),
    /// The integrator stopped before reaching the end of the grid.
    IntegrationFailed { status: Status, t: Float },
    /// The integrator produced a NaN or infinite state.
    NonFiniteState { t: Float },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IntegrationFailed { .. } | Error::NonFiniteState { .. } => {
                ErrorKind::Integration
            }
            _ => ErrorKind::InvalidInput,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    pub fn is_integration(&self) -> bool {
        self.kind() == ErrorKind::Integration
    }
}

impl From<Vec<Error>> for Error {
    fn from(mut errors: Vec<Error>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            Error::InvalidSettings(errors)
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyTimeGrid => write!(f, "time grid must have at least one entry"),
            Error::NonFiniteTimeGrid { index, value } => {
                write!(f, "time grid entry {} is not finite (got {})", index, value)
            }
            Error::NonMonotonicTimeGrid { index, prev, next } => write!(
                f,
                "time grid must be strictly increasing (entry {} is {} after {})",
                index, next, prev
            ),
            Error::StateDimension { expected, got } => write!(
                f,
                "initial state must have {} components (got {})",
                expected, got
            ),
            Error::NonFiniteInitialState => write!(f, "initial state must be finite"),
            Error::InvalidTolerance(v) => {
                write!(f, "tolerances must be positive and finite (got {})", v)
            }
            Error::ToleranceDimension { expected, got } => write!(
                f,
                "vector tolerances must have {} entries (got {})",
                expected, got
            ),
            Error::NMaxMustBePositive(v) => write!(f, "nmax must be positive (got {})", v),
            Error::NStiffMustBePositive(v) => write!(f, "nstiff must be positive (got {})", v),
            Error::NewtonMaxIterMustBePositive(v) => {
                write!(f, "newton_maxiter must be positive (got {})", v)
            }
            Error::NewtonTolOutOfRange(v) => {
                write!(f, "newton_tol must be in (uround, 1.0) (got {})", v)
            }
            Error::InvalidStepSize(v) => {
                write!(f, "step size must be positive and finite (got {})", v)
            }
            Error::URoundOutOfRange(v) => write!(f, "uround must be in (1e-35, 1.0) (got {})", v),
            Error::SafetyFactorOutOfRange(v) => {
                write!(f, "safety_factor must be in (1e-4, 1.0) (got {})", v)
            }
            Error::InvalidScaleFactors(min, max) => write!(
                f,
                "step scale factors must satisfy 0 < scale_min < scale_max (got {}, {})",
                min, max
            ),
            Error::BetaTooLarge(v) => write!(f, "beta must be <= 0.2 (got {})", v),
            Error::InvalidSettings(errors) => {
                write!(f, "invalid integrator settings: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            Error::IntegrationFailed { status, t } => {
                write!(f, "integration failed at t = {}: {}", t, status)
            }
            Error::NonFiniteState { t } => {
                write!(f, "integration produced a non-finite state at t = {}", t)
            }
        }
    }
}

impl std::error::Error for Error {}
