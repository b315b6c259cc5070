//! Solver entry points

use log::{debug, warn};

use crate::{
    Float,
    core::status::Status,
    error::Error,
    grid,
    methods::{dp::dopri5, radau::radau5, result::IntegrationResult, rk::rk23},
    oscillator::{State, VanDerPol},
};

use super::{
    options::{Method, SolveOptions},
    sampler::GridSampler,
    trajectory::{Stats, Trajectory},
};

/// Solve the Van der Pol oscillator with damping `eps` from `x_init` and
/// sample it at every entry of `time`, using default [`SolveOptions`].
///
/// `x_init` must hold exactly `[x, dx/dt]`. `time` must be non-empty, finite
/// and strictly increasing. The returned trajectory has `time.len()` states
/// and starts exactly at `x_init`.
///
/// # Example
///
/// ```
/// use vanderpol::prelude::*;
///
/// let time = arange(0.0, 40.0, 0.1).unwrap();
/// let traj = solve(0.0, &[1.0, 1.0], &time).unwrap();
/// assert_eq!(traj.len(), 400);
/// assert_eq!(traj[0], State::new(1.0, 1.0));
/// ```
pub fn solve(eps: Float, x_init: &[Float], time: &[Float]) -> Result<Trajectory, Error> {
    solve_with(eps, x_init, time, SolveOptions::default())
}

/// [`solve`] with explicit options.
pub fn solve_with(
    eps: Float,
    x_init: &[Float],
    time: &[Float],
    options: SolveOptions,
) -> Result<Trajectory, Error> {
    let init = initial_state(x_init)?;
    grid::validate(time)?;

    let t0 = time[0];
    let tend = time[time.len() - 1];
    debug!(
        "solving eps = {} from {:?} over [{}, {}] ({} points, {:?})",
        eps,
        init,
        t0,
        tend,
        time.len(),
        options.method
    );

    if time.len() == 1 {
        return Ok(Trajectory::new(
            time.to_vec(),
            vec![init],
            Stats::default(),
            Status::Success,
        ));
    }

    let vdp = VanDerPol::new(eps);
    let (mut sampler, mut result) = integrate(&vdp, options.method, init, time, &options)?;
    if options.method == Method::RK45 && result.status == Status::ProbablyStiff {
        warn!(
            "eps = {}: stiffness detected at t = {}, switching to Radau IIA",
            eps, result.x
        );
        let explicit_steps = result.steps;
        let explicit_evals = result.evals;
        (sampler, result) = integrate(&vdp, Method::Radau, init, time, &options)?;
        result.steps.total += explicit_steps.total;
        result.steps.accepted += explicit_steps.accepted;
        result.steps.rejected += explicit_steps.rejected;
        result.evals.ode += explicit_evals.ode;
    }

    if let Some(t) = sampler.non_finite_at() {
        warn!("eps = {}: non-finite state at t = {}", eps, t);
        return Err(Error::NonFiniteState { t });
    }
    if !result.status.is_success() {
        warn!("eps = {}: integration stopped at t = {}: {}", eps, result.x, result.status);
        return Err(Error::IntegrationFailed {
            status: result.status,
            t: result.x,
        });
    }

    let states = sampler.into_states();
    if states.len() != time.len() {
        warn!(
            "eps = {}: sampled {} of {} grid points",
            eps,
            states.len(),
            time.len()
        );
        return Err(Error::IntegrationFailed {
            status: result.status,
            t: result.x,
        });
    }

    let stats = Stats {
        nfev: result.evals.ode,
        nstep: result.steps.total,
        naccpt: result.steps.accepted,
        nrejct: result.steps.rejected,
    };
    debug!(
        "solved eps = {}: {} evaluations, {} accepted / {} rejected steps",
        eps, stats.nfev, stats.naccpt, stats.nrejct
    );

    Ok(Trajectory::new(time.to_vec(), states, stats, result.status))
}

/// One integration pass over the whole grid with a fresh sampler.
fn integrate<'a>(
    vdp: &VanDerPol,
    method: Method,
    init: State,
    time: &'a [Float],
    options: &SolveOptions,
) -> Result<(GridSampler<'a>, IntegrationResult), Error> {
    let mut sampler = GridSampler::new(time, init);
    let (t0, tend) = (time[0], time[time.len() - 1]);
    let mut y = init.to_array();
    let rtol = options.rtol.clone();
    let atol = options.atol.clone();
    let settings = options.settings();
    let result = match method {
        Method::RK45 => dopri5(vdp, t0, tend, &mut y, rtol, atol, Some(&mut sampler), settings),
        Method::RK23 => rk23(vdp, t0, tend, &mut y, rtol, atol, Some(&mut sampler), settings),
        Method::Radau => radau5(vdp, t0, tend, &mut y, rtol, atol, Some(&mut sampler), settings),
    }?;
    Ok((sampler, result))
}

fn initial_state(x_init: &[Float]) -> Result<State, Error> {
    let &[x, y] = x_init else {
        return Err(Error::StateDimension {
            expected: 2,
            got: x_init.len(),
        });
    };
    let state = State::new(x, y);
    if !state.is_finite() {
        return Err(Error::NonFiniteInitialState);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_checks_dimension() {
        assert_eq!(
            initial_state(&[1.0]),
            Err(Error::StateDimension { expected: 2, got: 1 })
        );
        assert_eq!(
            initial_state(&[1.0, 2.0, 3.0]),
            Err(Error::StateDimension { expected: 2, got: 3 })
        );
        assert_eq!(
            initial_state(&[Float::NAN, 0.0]),
            Err(Error::NonFiniteInitialState)
        );
        assert_eq!(initial_state(&[0.5, -1.0]), Ok(State::new(0.5, -1.0)));
    }

    #[test]
    fn single_point_grid_skips_integration() {
        let traj = solve(3.0, &[0.2, 0.1], &[7.0]).unwrap();
        assert_eq!(traj.len(), 1);
        assert_eq!(traj[0], State::new(0.2, 0.1));
        assert_eq!(traj.stats.nfev, 0);
    }

    #[test]
    fn invalid_options_are_input_errors() {
        let opts = SolveOptions::builder().rtol(-1.0).build();
        let err = solve_with(1.0, &[1.0, 0.0], &[0.0, 1.0], opts).unwrap_err();
        assert_eq!(err, Error::InvalidTolerance(-1.0));
        assert!(err.is_invalid_input());
    }
}
