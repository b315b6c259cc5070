//! SolOut that samples dense output at the requested time grid.

use crate::{
    Float,
    core::{
        interpolate::Interpolate,
        solout::{ControlFlag, SolOut},
    },
    oscillator::State,
};

/// Collects one state per grid point, in grid order.
///
/// The first grid point is seeded with the initial state, never
/// interpolated. Every later point is interpolated inside the accepted step
/// that covers it. Integration is interrupted as soon as a non-finite state
/// shows up.
pub(crate) struct GridSampler<'a> {
    time: &'a [Float],
    next_idx: usize,
    states: Vec<State>,
    non_finite_at: Option<Float>,
}

impl<'a> GridSampler<'a> {
    pub fn new(time: &'a [Float], init: State) -> Self {
        let mut states = Vec::with_capacity(time.len());
        states.push(init);
        Self {
            time,
            next_idx: 1,
            states,
            non_finite_at: None,
        }
    }

    /// Time at which a non-finite state was first produced.
    pub fn non_finite_at(&self) -> Option<Float> {
        self.non_finite_at
    }

    pub fn into_states(self) -> Vec<State> {
        self.states
    }
}

impl<'a> SolOut for GridSampler<'a> {
    fn solout<I: Interpolate>(
        &mut self,
        xold: Float,
        x: Float,
        y: &[Float],
        interpolator: &I,
    ) -> ControlFlag {
        if !y.iter().all(|v| v.is_finite()) {
            self.non_finite_at = Some(x);
            return ControlFlag::Interrupt;
        }
        // The initial call only reports the starting point
        if x <= xold {
            return ControlFlag::Continue;
        }

        // Points may sit a few ulps past the step end after rounding of `x + h`
        let tol = 16.0 * Float::EPSILON * x.abs().max(1.0);
        let mut yi = [0.0; 2];
        while self.next_idx < self.time.len() && self.time[self.next_idx] <= x + tol {
            let t = self.time[self.next_idx];
            interpolator.interpolate(t, &mut yi);
            let state = State::from(yi);
            if !state.is_finite() {
                self.non_finite_at = Some(t);
                return ControlFlag::Interrupt;
            }
            self.states.push(state);
            self.next_idx += 1;
        }

        ControlFlag::Continue
    }
}
