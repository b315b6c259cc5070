//! Demonstration scenarios: fixed damping and initial-condition batteries.
//!
//! Two families are plotted side by side: varying the initial conditions at
//! `eps = 0`, and varying `eps` from `(1, 1)`. All of them are sampled on
//! `arange(0, 40, 0.1)`, the grid used for the 100 FPS animation.

use std::thread;

use log::trace;

use crate::{
    Float,
    error::Error,
    grid::arange,
    oscillator::State,
    solve::{SolveOptions, Trajectory, solve_with},
};

/// Default grid end.
pub const T_END: Float = 40.0;
/// Default grid step.
pub const T_STEP: Float = 0.1;

/// A single `(eps, x_init, time grid)` case.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: &'static str,
    /// Legend entry for plots.
    pub label: &'static str,
    pub eps: Float,
    pub x_init: State,
    pub t_end: Float,
    pub t_step: Float,
}

impl Scenario {
    pub const fn new(name: &'static str, label: &'static str, eps: Float, x_init: State) -> Self {
        Self {
            name,
            label,
            eps,
            x_init,
            t_end: T_END,
            t_step: T_STEP,
        }
    }

    /// Same scenario sampled on `[0, t_end)`.
    pub fn with_t_end(mut self, t_end: Float) -> Self {
        self.t_end = t_end;
        self
    }

    pub fn time_grid(&self) -> Result<Vec<Float>, Error> {
        arange(0.0, self.t_end, self.t_step)
    }

    pub fn solve(&self) -> Result<Trajectory, Error> {
        self.solve_with(SolveOptions::default())
    }

    pub fn solve_with(&self, options: SolveOptions) -> Result<Trajectory, Error> {
        trace!("scenario {}: eps = {}, x_init = {:?}", self.name, self.eps, self.x_init);
        let time = self.time_grid()?;
        solve_with(self.eps, &self.x_init.to_array(), &time, options)
    }

    /// Zero initial conditions: the oscillator stays at rest.
    pub const fn no_init() -> Self {
        Self::new("no_init", "Zero initial conditions", 0.0, State::new(0.0, 0.0))
    }

    pub const fn first_zero() -> Self {
        Self::new(
            "first_0",
            "Initial Conditions: x = 0, dx/dt = 1",
            0.0,
            State::new(0.0, 1.0),
        )
    }

    pub const fn second_zero() -> Self {
        Self::new(
            "second_0",
            "Initial Conditions: x = 1, dx/dt = 0",
            0.0,
            State::new(1.0, 0.0),
        )
    }

    pub const fn both_nonzero_equal() -> Self {
        Self::new(
            "both_nonzero_equal",
            "Initial Conditions: x = 1, dx/dt = 1",
            0.0,
            State::new(1.0, 1.0),
        )
    }

    pub const fn both_nonzero_unequal() -> Self {
        Self::new(
            "both_nonzero_unequal",
            "Initial Conditions: x = 1.5, dx/dt = 2",
            0.0,
            State::new(1.5, 2.0),
        )
    }

    pub const fn eps_0() -> Self {
        Self::new("eps_0", "Damping Factor: eps = 0", 0.0, State::new(1.0, 1.0))
    }

    pub const fn eps_0_5() -> Self {
        Self::new("eps_0_5", "Damping Factor: eps = 0.5", 0.5, State::new(1.0, 1.0))
    }

    pub const fn eps_1() -> Self {
        Self::new("eps_1", "Damping Factor: eps = 1", 1.0, State::new(1.0, 1.0))
    }

    pub const fn eps_5() -> Self {
        Self::new("eps_5", "Damping Factor: eps = 5", 5.0, State::new(1.0, 1.0))
    }

    /// The case rendered as the amplitude animation.
    pub const fn animation() -> Self {
        Self::new(
            "animation",
            "van Der Pol Oscillator",
            2.0,
            State::new(1.0, 1.0),
        )
    }
}

/// A titled family of scenarios drawn on one figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioGroup {
    pub title: &'static str,
    pub xlabel: &'static str,
    pub ylabel: &'static str,
    pub scenarios: Vec<Scenario>,
}

impl ScenarioGroup {
    pub fn initial_conditions() -> Self {
        Self {
            title: "Variation of Initial Conditions",
            xlabel: "Time",
            ylabel: "Amplitude",
            scenarios: vec![
                Scenario::no_init(),
                Scenario::first_zero(),
                Scenario::second_zero(),
                Scenario::both_nonzero_equal(),
                Scenario::both_nonzero_unequal(),
            ],
        }
    }

    pub fn damping() -> Self {
        Self {
            title: "Variation of Damping Factor",
            xlabel: "Time",
            ylabel: "Amplitude",
            scenarios: vec![
                Scenario::eps_0(),
                Scenario::eps_0_5(),
                Scenario::eps_1(),
                Scenario::eps_5(),
            ],
        }
    }

    /// Both figure families, initial conditions first.
    pub fn all() -> Vec<Self> {
        vec![Self::initial_conditions(), Self::damping()]
    }

    pub fn legend(&self) -> Vec<&'static str> {
        self.scenarios.iter().map(|s| s.label).collect()
    }

    /// Solve every scenario in order on the calling thread.
    pub fn solve_all(&self) -> Vec<Result<Trajectory, Error>> {
        self.scenarios.iter().map(Scenario::solve).collect()
    }

    /// Solve every scenario on its own thread. Results keep scenario order.
    pub fn solve_all_parallel(&self) -> Vec<Result<Trajectory, Error>> {
        thread::scope(|s| {
            let handles: Vec<_> = self
                .scenarios
                .iter()
                .map(|scenario| s.spawn(move || scenario.solve()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }
}
