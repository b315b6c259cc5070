//! DOPRI5 - Dormand–Prince 5(4) explicit Runge–Kutta integrator
//!
//! Reference
//! - E. Hairer, S. P. Nørsett, and G. Wanner, "Solving Ordinary Differential
//!   Equations I. Nonstiff Problems", 2nd ed., Springer (1993).
//!

use crate::{
    Float,
    core::{
        interpolate::Interpolate,
        ode::ODE,
        solout::{ControlFlag, SolOut},
        status::Status,
    },
    error::Error,
    methods::{
        hinit::hinit,
        result::{Evals, IntegrationResult, Steps},
        settings::{Settings, Tolerance},
    },
};

/// Dormand–Prince DOPRI5 — explicit embedded Runge–Kutta 5(4) solver with
/// adaptive step-size control and dense output.
///
/// Integrates `y' = f(x, y)` from `x` to `xend`, advancing the provided state
/// buffer `y` in-place. When `solout` is provided, dense-output coefficients
/// are computed every accepted step and handed to the callback as an
/// [`Interpolate`] implementation valid on the step.
///
/// # Arguments
/// - `f`: Right‑hand side implementing `ODE`.
/// - `x`: Initial independent variable value.
/// - `xend`: Final independent variable value.
/// - `y`: Initial state; on return holds the state at the final `x`.
/// - `rtol`, `atol`: Relative and absolute tolerances (see [`Tolerance`]).
/// - `solout`: Optional callback invoked after each accepted step.
/// - `settings`: Optional settings. Defaults:
///   `uround = 2.3e-16`, `safety_factor = 0.9`, `scale_min = 0.2`,
///   `scale_max = 10.0`, `beta = 0.04`, `hmax = |xend - x|`,
///   `h0` from [`hinit`], `nmax = 100_000`, `nstiff = 1000`.
///
/// # Returns
/// `IntegrationResult` on completion (check `status`), or every settings
/// validation error found.
pub fn dopri5<F, S>(
    f: &F,
    mut x: Float,
    xend: Float,
    y: &mut [Float],
    rtol: Tolerance,
    atol: Tolerance,
    mut solout: Option<&mut S>,
    settings: Settings,
) -> Result<IntegrationResult, Vec<Error>>
where
    F: ODE,
    S: SolOut,
{
    // --- Input Validation ---
    let mut errors: Vec<Error> = Vec::new();

    // Rounding Unit
    let uround = match settings.uround {
        Some(u) => {
            if u <= 1e-35 || u >= 1.0 {
                errors.push(Error::URoundOutOfRange(u));
            }
            u
        }
        None => 2.3e-16,
    };

    // Safety Factor
    let safety_factor = match settings.safety_factor {
        Some(f) => {
            if f >= 1.0 || f <= 1e-4 {
                errors.push(Error::SafetyFactorOutOfRange(f));
            }
            f
        }
        None => 0.9,
    };

    // Parameters for step size selection
    let scale_min = settings.scale_min.unwrap_or(0.2);
    let scale_max = settings.scale_max.unwrap_or(10.0);
    if scale_min <= 0.0 || scale_max <= scale_min {
        errors.push(Error::InvalidScaleFactors(scale_min, scale_max));
    }
    let facc1 = 1.0 / scale_min;
    let facc2 = 1.0 / scale_max;

    // Beta for step control stabilization
    let beta = match settings.beta {
        Some(b) => {
            if b > 0.2 {
                errors.push(Error::BetaTooLarge(b));
            }
            b.max(0.0)
        }
        None => 0.04,
    };

    // Maximum step size
    let h_max = match settings.hmax {
        Some(h) => {
            if !(h.is_finite() && h > 0.0) {
                errors.push(Error::InvalidStepSize(h));
            }
            h.abs()
        }
        None => (xend - x).abs(),
    };

    // Maximum Number of Steps
    let nmax = match settings.nmax {
        Some(n) => {
            if n == 0 {
                errors.push(Error::NMaxMustBePositive(n));
            }
            n
        }
        None => 100_000,
    };

    // Number of steps before performing a stiffness test
    let nstiff = match settings.nstiff {
        Some(n) => {
            if n == 0 {
                errors.push(Error::NStiffMustBePositive(n));
            }
            n
        }
        None => 1000,
    };

    if let Some(h0) = settings.h0 {
        if !(h0.is_finite() && h0 != 0.0) {
            errors.push(Error::InvalidStepSize(h0));
        }
    }

    for tol in [&rtol, &atol] {
        if let Some(v) = tol.first_invalid() {
            errors.push(Error::InvalidTolerance(v));
        }
        if let Some(got) = tol.len_mismatch(y.len()) {
            errors.push(Error::ToleranceDimension {
                expected: y.len(),
                got,
            });
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // --- Declarations ---
    let n = y.len();
    let mut k1 = vec![0.0; n];
    let mut k2 = vec![0.0; n];
    let mut k3 = vec![0.0; n];
    let mut k4 = vec![0.0; n];
    let mut k5 = vec![0.0; n];
    let mut k6 = vec![0.0; n];
    let mut y1 = vec![0.0; n];
    let mut ysti = vec![0.0; n];
    let mut cont = vec![0.0; n * 5];
    let dense_output = solout.is_some();
    let mut facold: Float = 1e-4;
    let mut last = false;
    let mut reject = false;
    let mut nonstiff = 0;
    let mut hlamb: Float = 0.0;
    let mut iasti = 0;
    let mut evals = Evals::new();
    let mut steps = Steps::new();
    let status;
    let expo1 = 0.2 - beta * 0.75;
    let posneg = if xend >= x { 1.0 } else { -1.0 };

    // --- Initializations ---
    f.ode(x, y, &mut k1);
    evals.ode += 1;
    let mut h = match settings.h0 {
        Some(h0) => h0.abs().min(h_max) * posneg,
        None => {
            evals.ode += 1;
            hinit(f, x, y, posneg, &k1, &mut k2, &mut y1, 5, h_max, &atol, &rtol)
        }
    };

    // Initial SolOut call with a constant interpolant
    if let Some(solout) = solout.as_mut() {
        cont[..n].copy_from_slice(y);
        let interpolator = DenseOutput::new(&cont, x, h);
        if solout.solout(x, x, y, &interpolator) == ControlFlag::Interrupt {
            return Ok(IntegrationResult::new(x, h, Status::UserInterrupt, evals, steps));
        }
    }

    if x == xend {
        return Ok(IntegrationResult::new(x, h, Status::Success, evals, steps));
    }

    // --- Main integration loop ---
    loop {
        // Check for maximum number of steps
        if steps.total >= nmax {
            status = Status::NeedLargerNMax;
            break;
        }

        // Check for underflow due to machine rounding
        if 0.1 * h.abs() <= x.abs() * uround {
            status = Status::StepSizeTooSmall;
            break;
        }

        // Adjust last step to land on xend
        if (x + 1.01 * h - xend) * posneg > 0.0 {
            h = xend - x;
            last = true;
        }

        steps.total += 1;

        // Stage 2
        for i in 0..n {
            y1[i] = y[i] + h * A21 * k1[i];
        }
        f.ode(x + C2 * h, &y1, &mut k2);

        // Stage 3
        for i in 0..n {
            y1[i] = y[i] + h * (A31 * k1[i] + A32 * k2[i]);
        }
        f.ode(x + C3 * h, &y1, &mut k3);

        // Stage 4
        for i in 0..n {
            y1[i] = y[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
        }
        f.ode(x + C4 * h, &y1, &mut k4);

        // Stage 5
        for i in 0..n {
            y1[i] = y[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
        }
        f.ode(x + C5 * h, &y1, &mut k5);

        // Stage 6
        for i in 0..n {
            ysti[i] =
                y[i] + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
        }
        let xph = x + h;
        f.ode(xph, &ysti, &mut k6);

        // Final stage
        for i in 0..n {
            y1[i] =
                y[i] + h * (A71 * k1[i] + A73 * k3[i] + A74 * k4[i] + A75 * k5[i] + A76 * k6[i]);
        }
        f.ode(xph, &y1, &mut k2);
        evals.ode += 6;

        // Last segment of dense output needs k4 before it is reused
        if dense_output {
            for i in 0..n {
                cont[4 * n + i] = h
                    * (D1 * k1[i] + D3 * k3[i] + D4 * k4[i] + D5 * k5[i] + D6 * k6[i] + D7 * k2[i]);
            }
        }

        // k4 holds the local error estimate from here on
        for i in 0..n {
            k4[i] =
                (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k2[i]) * h;
        }

        // Error estimation
        let mut err: Float = 0.0;
        for i in 0..n {
            let sk = atol[i] + rtol[i] * y[i].abs().max(y1[i].abs());
            err += (k4[i] / sk) * (k4[i] / sk);
        }
        err = (err / n as Float).sqrt();
        if !err.is_finite() {
            err = Float::MAX;
        }

        // Computation of hnew
        let fac11 = err.powf(expo1);
        // Lund-Stabilization
        let mut fac = fac11 / facold.powf(beta);
        // We require scale_min <= hnew/h <= scale_max
        fac = facc2.max(facc1.min(fac / safety_factor));
        let mut hnew = h / fac;

        if err <= 1.0 {
            // Step accepted
            facold = err.max(1.0e-4);
            steps.accepted += 1;

            // Stiffness detection
            if steps.accepted % nstiff == 0 || iasti > 0 {
                let mut stnum: Float = 0.0;
                let mut stden: Float = 0.0;
                for i in 0..n {
                    let d1 = k2[i] - k6[i];
                    let d2 = y1[i] - ysti[i];
                    stnum += d1 * d1;
                    stden += d2 * d2;
                }
                if stden > 0.0 {
                    hlamb = h.abs() * (stnum / stden).sqrt();
                }
                if hlamb > 3.25 {
                    nonstiff = 0;
                    iasti += 1;
                    if iasti == 15 {
                        status = Status::ProbablyStiff;
                        break;
                    }
                } else {
                    nonstiff += 1;
                    if nonstiff == 6 {
                        iasti = 0;
                    }
                }
            }

            // Prepare dense output
            if dense_output {
                for i in 0..n {
                    let ydiff = y1[i] - y[i];
                    let bspl = h * k1[i] - ydiff;
                    cont[i] = y[i];
                    cont[n + i] = ydiff;
                    cont[2 * n + i] = bspl;
                    cont[3 * n + i] = -h * k2[i] + ydiff - bspl;
                }
            }

            // Update state variables
            k1.copy_from_slice(&k2);
            y.copy_from_slice(&y1);
            let xold = x;
            x = if last { xend } else { xph };

            if let Some(solout) = solout.as_mut() {
                let interpolator = DenseOutput::new(&cont, xold, h);
                if solout.solout(xold, x, y, &interpolator) == ControlFlag::Interrupt {
                    status = Status::UserInterrupt;
                    break;
                }
            }

            // Normal exit
            if last {
                h = hnew;
                status = Status::Success;
                break;
            }

            // Check for step size limits
            if hnew.abs() > h_max {
                hnew = posneg * h_max;
            }

            // Prevent oscillations due to previous rejected step
            if reject {
                hnew = posneg * hnew.abs().min(h.abs());
                reject = false;
            }
        } else {
            // Step rejected
            hnew = h / facc1.min(fac11 / safety_factor);
            reject = true;
            if steps.accepted >= 1 {
                steps.rejected += 1;
            }
            last = false;
        }
        h = hnew;
    }

    Ok(IntegrationResult::new(x, h, status, evals, steps))
}

/// Continuous output function for DOPRI5
pub fn contdp5(xi: Float, yi: &mut [Float], cont: &[Float], xold: Float, h: Float) {
    let n = cont.len() / 5;
    let theta = if h == 0.0 { 0.0 } else { (xi - xold) / h };
    let theta1 = 1.0 - theta;
    for i in 0..n {
        yi[i] = cont[i]
            + theta
                * (cont[n + i]
                    + theta1
                        * (cont[2 * n + i] + theta * (cont[3 * n + i] + theta1 * cont[4 * n + i])));
    }
}

/// Dense output interpolator for DOPRI5
struct DenseOutput<'a> {
    cont: &'a [Float],
    xold: Float,
    h: Float,
}

impl<'a> DenseOutput<'a> {
    fn new(cont: &'a [Float], xold: Float, h: Float) -> Self {
        Self { cont, xold, h }
    }
}

impl<'a> Interpolate for DenseOutput<'a> {
    fn interpolate(&self, xi: Float, yi: &mut [Float]) {
        contdp5(xi, yi, self.cont, self.xold, self.h);
    }
}

// DOPRI5 Butcher tableau coefficients
const C2: Float = 0.2;
const C3: Float = 0.3;
const C4: Float = 0.8;
const C5: Float = 8.0 / 9.0;

const A21: Float = 0.2;
const A31: Float = 3.0 / 40.0;
const A32: Float = 9.0 / 40.0;
const A41: Float = 44.0 / 45.0;
const A42: Float = -56.0 / 15.0;
const A43: Float = 32.0 / 9.0;
const A51: Float = 19372.0 / 6561.0;
const A52: Float = -25360.0 / 2187.0;
const A53: Float = 64448.0 / 6561.0;
const A54: Float = -212.0 / 729.0;
const A61: Float = 9017.0 / 3168.0;
const A62: Float = -355.0 / 33.0;
const A63: Float = 46732.0 / 5247.0;
const A64: Float = 49.0 / 176.0;
const A65: Float = -5103.0 / 18656.0;
const A71: Float = 35.0 / 384.0;
const A73: Float = 500.0 / 1113.0;
const A74: Float = 125.0 / 192.0;
const A75: Float = -2187.0 / 6784.0;
const A76: Float = 11.0 / 84.0;

const E1: Float = 71.0 / 57600.0;
const E3: Float = -71.0 / 16695.0;
const E4: Float = 71.0 / 1920.0;
const E5: Float = -17253.0 / 339200.0;
const E6: Float = 22.0 / 525.0;
const E7: Float = -1.0 / 40.0;

const D1: Float = -12715105075.0 / 11282082432.0;
const D3: Float = 87487479700.0 / 32700410799.0;
const D4: Float = -10690763975.0 / 1880347072.0;
const D5: Float = 701980252875.0 / 199316789632.0;
const D6: Float = -1453857185.0 / 822651844.0;
const D7: Float = 69997945.0 / 29380423.0;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Harmonic;

    impl ODE for Harmonic {
        fn ode(&self, _x: Float, y: &[Float], dydx: &mut [Float]) {
            dydx[0] = y[1];
            dydx[1] = -y[0];
        }
    }

    struct Midpoint {
        at: Float,
        value: Option<Vec<Float>>,
    }

    impl SolOut for Midpoint {
        fn solout<I: Interpolate>(
            &mut self,
            xold: Float,
            x: Float,
            y: &[Float],
            interpolator: &I,
        ) -> ControlFlag {
            if self.value.is_none() && xold < self.at && self.at <= x {
                let mut yi = vec![0.0; y.len()];
                interpolator.interpolate(self.at, &mut yi);
                self.value = Some(yi);
            }
            ControlFlag::Continue
        }
    }

    #[test]
    fn harmonic_full_period() {
        let mut y = [1.0, 0.0];
        let xend = 2.0 * std::f64::consts::PI as Float;
        let res = dopri5::<_, Midpoint>(
            &Harmonic,
            0.0,
            xend,
            &mut y,
            1e-10.into(),
            1e-10.into(),
            None,
            Settings::default(),
        )
        .unwrap();
        assert_eq!(res.status, Status::Success);
        assert_abs_diff_eq!(res.x, xend, epsilon = 1e-12);
        assert_abs_diff_eq!(y[0], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(y[1], 0.0, epsilon = 1e-8);
        assert!(res.steps.accepted > 0);
        assert!(res.evals.ode > 6 * res.steps.accepted);
    }

    #[test]
    fn dense_output_matches_closed_form() {
        let mut y = [1.0, 0.0];
        let mut probe = Midpoint { at: 1.2345, value: None };
        let res = dopri5(
            &Harmonic,
            0.0,
            3.0,
            &mut y,
            1e-9.into(),
            1e-9.into(),
            Some(&mut probe),
            Settings::default(),
        )
        .unwrap();
        assert!(res.status.is_success());
        let yi = probe.value.unwrap();
        assert_abs_diff_eq!(yi[0], (1.2345 as Float).cos(), epsilon = 1e-6);
        assert_abs_diff_eq!(yi[1], -(1.2345 as Float).sin(), epsilon = 1e-6);
    }

    #[test]
    fn settings_errors_are_collected() {
        let mut y = [1.0, 0.0];
        let settings = Settings::builder().nmax(0).safety_factor(2.0).build();
        let errors = dopri5::<_, Midpoint>(
            &Harmonic,
            0.0,
            1.0,
            &mut y,
            1e-6.into(),
            (-1.0).into(),
            None,
            settings,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&Error::NMaxMustBePositive(0)));
        assert!(errors.contains(&Error::SafetyFactorOutOfRange(2.0)));
        assert!(errors.contains(&Error::InvalidTolerance(-1.0)));
    }

    #[test]
    fn step_budget_is_reported() {
        let mut y = [1.0, 0.0];
        let settings = Settings::builder().nmax(3).build();
        let res = dopri5::<_, Midpoint>(
            &Harmonic,
            0.0,
            100.0,
            &mut y,
            1e-10.into(),
            1e-10.into(),
            None,
            settings,
        )
        .unwrap();
        assert_eq!(res.status, Status::NeedLargerNMax);
        assert!(res.x < 100.0);
    }
}
