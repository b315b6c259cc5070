//! # Example: Van der Pol oscillator scenarios
//!
//! Solves the two demonstration families (initial conditions at eps = 0,
//! damping from (1, 1)) on the 0..40 step 0.1 grid, one thread per scenario,
//! and prints a summary of each trajectory.
//!
//! Equations:
//! dx/dt = y
//! dy/dt = -x + eps * (1 - x^2) * y
//!

use vanderpol::prelude::*;

fn main() {
    for group in ScenarioGroup::all() {
        println!("{} ({} vs {})", group.title, group.ylabel, group.xlabel);
        for (scenario, result) in group.scenarios.iter().zip(group.solve_all_parallel()) {
            match result {
                Ok(traj) => {
                    let amp = traj
                        .states()
                        .iter()
                        .map(|s| s.x.abs())
                        .fold(0.0, Float::max);
                    println!("  {}", scenario.label);
                    println!("    samples: {}, max |x|: {:.4}", traj.len(), amp);
                    if let Some(last) = traj.last() {
                        println!("    final state: x = {:.5}, dx/dt = {:.5}", last.x, last.y);
                    }
                    println!(
                        "    function evaluations: {}, accepted steps: {}, rejected steps: {}",
                        traj.stats.nfev, traj.stats.naccpt, traj.stats.nrejct
                    );
                }
                Err(e) => eprintln!("  {} failed: {}", scenario.label, e),
            }
        }
    }

    let scenario = Scenario::animation();
    match scenario.solve() {
        Ok(traj) => {
            println!("{} (eps = {})", scenario.label, scenario.eps);
            for (t, s) in traj.iter().step_by(50) {
                println!("  t = {:>5.1}, x = {:>8.5}", t, s.x);
            }
        }
        Err(e) => eprintln!("animation scenario failed: {}", e),
    }
}
