use approx::assert_abs_diff_eq;
use vanderpol::prelude::*;

mod common;
use common::{default_grid, harmonic, tight_opts};

#[test]
fn first_state_is_initial_and_lengths_match() {
    let time = default_grid();
    for eps in [0.0, 0.5, 1.0, 2.0, 5.0] {
        for x_init in [[0.0, 1.0], [1.0, 0.0], [1.0, 1.0], [1.5, 2.0]] {
            let traj = solve(eps, &x_init, &time).unwrap();
            assert_eq!(traj.len(), time.len());
            assert_eq!(traj.time(), time.as_slice());
            assert_eq!(traj[0], State::from(x_init));
            assert!(traj.status.is_success());
        }
    }
}

#[test]
fn harmonic_case_starting_at_rest_is_cosine() {
    let time = linspace(0.0, 5.0, 51);
    let traj = solve(0.0, &[1.0, 0.0], &time).unwrap();
    for (t, s) in traj.iter() {
        assert_abs_diff_eq!(s.x, t.cos(), epsilon = 1e-4);
        assert_abs_diff_eq!(s.y, -t.sin(), epsilon = 1e-4);
    }
}

#[test]
fn harmonic_case_matches_closed_form_over_full_grid() {
    let time = default_grid();
    let traj = solve_with(0.0, &[1.5, 2.0], &time, tight_opts(Method::RK45)).unwrap();
    for (t, s) in traj.iter() {
        let exact = harmonic(1.5, 2.0, t);
        assert_abs_diff_eq!(s.x, exact.x, epsilon = 1e-5);
        assert_abs_diff_eq!(s.y, exact.y, epsilon = 1e-5);
    }
}

#[test]
fn rk23_matches_closed_form() {
    let time = arange(0.0, 10.0, 0.1).unwrap();
    let opts = SolveOptions::builder()
        .method(Method::RK23)
        .rtol(1e-8)
        .atol(1e-8)
        .build();
    let traj = solve_with(0.0, &[0.0, 1.0], &time, opts).unwrap();
    for (t, s) in traj.iter() {
        assert_abs_diff_eq!(s.x, t.sin(), epsilon = 1e-4);
    }
}

#[test]
fn scenario_eps_zero_from_one_one() {
    let time = arange(0.0, 40.0, 0.1).unwrap();
    let traj = solve(0.0, &[1.0, 1.0], &time).unwrap();
    assert_eq!(traj.len(), 400);
    assert_eq!(traj[0], State::new(1.0, 1.0));
    // Energy of the linear oscillator is conserved.
    for s in traj.states() {
        assert_abs_diff_eq!(s.x * s.x + s.y * s.y, 2.0, epsilon = 1e-2);
    }
}

#[test]
fn non_uniform_grid_is_honoured() {
    let time = [0.0, 0.05, 1.0, 1.01, 3.0, 7.5];
    let traj = solve_with(0.0, &[1.0, 0.0], &time, tight_opts(Method::RK45)).unwrap();
    assert_eq!(traj.len(), time.len());
    for (t, s) in traj.iter() {
        assert_abs_diff_eq!(s.x, t.cos(), epsilon = 1e-7);
    }
}

#[test]
fn grid_may_start_after_zero() {
    let time = [2.0, 3.0, 4.0];
    let traj = solve_with(0.0, &[1.0, 0.0], &time, tight_opts(Method::RK45)).unwrap();
    assert_eq!(traj[0], State::new(1.0, 0.0));
    assert_abs_diff_eq!(traj[2].x, (2.0 as Float).cos(), epsilon = 1e-7);
}

#[test]
fn positive_damping_reaches_limit_cycle() {
    let time = default_grid();
    let traj = solve(1.0, &[1.0, 1.0], &time).unwrap();
    let late_max = traj
        .iter()
        .filter(|(t, _)| *t > 25.0)
        .map(|(_, s)| s.x.abs())
        .fold(0.0, Float::max);
    assert!(late_max > 1.9 && late_max < 2.1, "amplitude {}", late_max);
}

#[test]
fn negative_damping_decays_inside_the_cycle() {
    let time = arange(0.0, 20.0, 0.1).unwrap();
    let traj = solve(-0.5, &[0.5, 0.0], &time).unwrap();
    let last = traj.last().unwrap();
    assert!(last.x.abs() < 0.1 && last.y.abs() < 0.1, "{:?}", last);
}

#[test]
fn solving_twice_is_deterministic() {
    let time = default_grid();
    let a = solve(5.0, &[1.0, 1.0], &time).unwrap();
    let b = solve(5.0, &[1.0, 1.0], &time).unwrap();
    assert_eq!(a, b);
}

#[test]
fn methods_agree_on_nonlinear_case() {
    let time = arange(0.0, 10.0, 0.1).unwrap();
    let rk45 = solve_with(1.0, &[1.0, 1.0], &time, tight_opts(Method::RK45)).unwrap();
    let rk23 = solve_with(1.0, &[1.0, 1.0], &time, tight_opts(Method::RK23)).unwrap();
    for (a, b) in rk45.states().iter().zip(rk23.states()) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-4);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-4);
    }
    assert!(rk23.stats.nfev > rk45.stats.nfev);
}

#[test]
fn columns_line_up_with_time() {
    let time = arange(0.0, 2.0, 0.5).unwrap();
    let traj = solve(0.5, &[1.0, 0.0], &time).unwrap();
    let x = traj.displacement();
    let v = traj.velocity();
    assert_eq!(x.len(), time.len());
    assert_eq!(v.len(), time.len());
    for i in 0..time.len() {
        assert_eq!(x[i], traj[i].x);
        assert_eq!(v[i], traj[i].y);
    }
}

#[test]
fn invalid_input_is_rejected() {
    let err = solve(1.0, &[1.0, 1.0], &[]).unwrap_err();
    assert_eq!(err, Error::EmptyTimeGrid);
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = solve(1.0, &[1.0, 1.0], &[0.0, 2.0, 1.0]).unwrap_err();
    assert!(matches!(err, Error::NonMonotonicTimeGrid { index: 2, .. }));

    let err = solve(1.0, &[1.0, 1.0, 0.0], &[0.0, 1.0]).unwrap_err();
    assert_eq!(err, Error::StateDimension { expected: 2, got: 3 });
    assert!(err.is_invalid_input());

    let opts = SolveOptions::builder().nmax(0).build();
    let err = solve_with(1.0, &[1.0, 1.0], &[0.0, 1.0], opts).unwrap_err();
    assert_eq!(err, Error::NMaxMustBePositive(0));
}

#[test]
fn exhausted_step_budget_is_an_integration_error() {
    let time = default_grid();
    let opts = SolveOptions::builder().max_step(1e-3).nmax(100).build();
    let err = solve_with(1.0, &[1.0, 1.0], &time, opts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integration);
    match err {
        Error::IntegrationFailed { status, t } => {
            assert_eq!(status, Status::NeedLargerNMax);
            assert!(t < 1.0);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn vector_tolerance_must_match_state_dimension() {
    for method in [Method::RK45, Method::RK23, Method::Radau] {
        let opts = SolveOptions::builder().method(method).rtol(vec![1e-6]).build();
        let err = solve_with(1.0, &[1.0, 1.0], &[0.0, 1.0], opts).unwrap_err();
        assert_eq!(err, Error::ToleranceDimension { expected: 2, got: 1 });
        assert!(err.is_invalid_input());

        let opts = SolveOptions::builder().method(method).atol([1e-6; 3]).build();
        let err = solve_with(1.0, &[1.0, 1.0], &[0.0, 1.0], opts).unwrap_err();
        assert_eq!(err, Error::ToleranceDimension { expected: 2, got: 3 });
    }

    let opts = SolveOptions::builder().rtol([1e-8, 1e-6]).atol([1e-8, 1e-6]).build();
    let traj = solve_with(1.0, &[1.0, 1.0], &[0.0, 0.5, 1.0], opts).unwrap();
    assert_eq!(traj.len(), 3);
}

#[test]
fn large_damping_switches_to_stiff_solver() {
    let time = default_grid();
    for eps in [50.0, 100.0, 1000.0] {
        let traj = solve(eps, &[1.0, 1.0], &time)
            .unwrap_or_else(|e| panic!("eps = {} failed: {}", eps, e));
        assert_eq!(traj.len(), 400);
        assert_eq!(traj[0], State::new(1.0, 1.0));
        assert!(traj.status.is_success());
        // relaxation oscillation: the displacement stays on the slow branches
        assert!(traj.states().iter().all(|s| s.is_finite() && s.x.abs() < 2.2));
    }
}

#[test]
fn stiff_fallback_matches_direct_radau() {
    let time = default_grid();
    let fallback = solve(100.0, &[1.0, 1.0], &time).unwrap();
    let opts = SolveOptions::builder().method(Method::Radau).build();
    let radau = solve_with(100.0, &[1.0, 1.0], &time, opts).unwrap();
    assert_eq!(fallback.states(), radau.states());
    // the abandoned explicit attempt is still counted
    assert!(fallback.stats.nfev > radau.stats.nfev);
}

#[test]
fn radau_agrees_with_explicit_methods() {
    let time = arange(0.0, 10.0, 0.1).unwrap();
    let rk45 = solve_with(1.0, &[1.0, 1.0], &time, tight_opts(Method::RK45)).unwrap();
    let radau = solve_with(1.0, &[1.0, 1.0], &time, tight_opts(Method::Radau)).unwrap();
    for (a, b) in rk45.states().iter().zip(radau.states()) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-4);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-4);
    }

    let harmonic_case = solve_with(0.0, &[1.0, 0.0], &time, tight_opts(Method::Radau)).unwrap();
    for (t, s) in harmonic_case.iter() {
        assert_abs_diff_eq!(s.x, t.cos(), epsilon = 1e-5);
    }
}
