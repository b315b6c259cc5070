//! Sampled trajectory returned by the solver.

use std::ops::Index;

use crate::{Float, core::status::Status, oscillator::State};

/// Integration statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub nfev: usize,
    pub nstep: usize,
    pub naccpt: usize,
    pub nrejct: usize,
}

/// One state per requested time point, in grid order.
///
/// `traj[i]` is the state at `traj.time()[i]`, for every `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    time: Vec<Float>,
    states: Vec<State>,
    pub stats: Stats,
    pub status: Status,
}

impl Trajectory {
    pub(crate) fn new(time: Vec<Float>, states: Vec<State>, stats: Stats, status: Status) -> Self {
        debug_assert_eq!(time.len(), states.len());
        Self {
            time,
            states,
            stats,
            status,
        }
    }

    pub fn time(&self) -> &[Float] {
        &self.time
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<State> {
        self.states.get(i).copied()
    }

    pub fn last(&self) -> Option<State> {
        self.states.last().copied()
    }

    /// Displacement column `x(t)`.
    pub fn displacement(&self) -> Vec<Float> {
        self.states.iter().map(|s| s.x).collect()
    }

    /// Velocity column `dx/dt`.
    pub fn velocity(&self) -> Vec<Float> {
        self.states.iter().map(|s| s.y).collect()
    }

    /// Iterate over `(t, state)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Float, State)> + '_ {
        self.time.iter().copied().zip(self.states.iter().copied())
    }

    pub fn into_parts(self) -> (Vec<Float>, Vec<State>) {
        (self.time, self.states)
    }
}

impl Index<usize> for Trajectory {
    type Output = State;

    fn index(&self, index: usize) -> &Self::Output {
        &self.states[index]
    }
}
