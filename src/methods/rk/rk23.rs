//! Bogacki–Shampine 3(2) pair (RK23) adaptive-step integrator.

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

/// Bogacki–Shampine 3(2) pair (RK23) adaptive-step integrator.
/// This implementation uses an embedded method to estimate errors
/// and adjust the step size accordingly with dense output.
///
/// Arguments and return value follow [`dopri5`](crate::methods::dp::dopri5).
/// Defaults: `safety_factor = 0.9`, `scale_min = 0.2`, `scale_max = 5.0`,
/// `hmax = |xend - x|`, `nmax = 100_000`.
pub fn rk23<F, S>(
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

    // Step size scaling factors
    let scale_min = settings.scale_min.unwrap_or(0.2);
    let scale_max = settings.scale_max.unwrap_or(5.0);
    if scale_min <= 0.0 || scale_max <= scale_min {
        errors.push(Error::InvalidScaleFactors(scale_min, scale_max));
    }

    // Error exponent
    let error_exponent = -1.0 / 3.0;

    // Maximum step size
    let hmax = match settings.hmax {
        Some(h) => {
            if !(h.is_finite() && h > 0.0) {
                errors.push(Error::InvalidStepSize(h));
            }
            h.abs()
        }
        None => (xend - x).abs(),
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

    let uround = settings.uround.unwrap_or(2.3e-16);
    if uround <= 1e-35 || uround >= 1.0 {
        errors.push(Error::URoundOutOfRange(uround));
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
    let mut yt = vec![0.0; n];
    let mut ye = vec![0.0; n];
    let mut cont = vec![0.0; 4 * n];
    let mut evals = Evals::new();
    let mut steps = Steps::new();
    let status;
    let direction = if xend >= x { 1.0 } else { -1.0 };

    // --- Initializations ---
    f.ode(x, y, &mut k1);
    evals.ode += 1;
    let mut h = match settings.h0 {
        Some(h0) => h0.abs().min(hmax) * direction,
        None => {
            evals.ode += 1;
            hinit(f, x, y, direction, &k1, &mut k2, &mut k3, 3, hmax, &atol, &rtol)
        }
    };

    if let Some(solout) = solout.as_mut() {
        cont[0..n].copy_from_slice(y);
        let interp = DenseOutput::new(&cont, x, h);
        if solout.solout(x, x, y, &interp) == ControlFlag::Interrupt {
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

        // Check for last step adjustment
        let last = (x + h - xend) * direction >= 0.0;
        if last {
            h = xend - x;
        }

        steps.total += 1;

        // Stage 2
        for i in 0..n {
            yt[i] = y[i] + h * A21 * k1[i];
        }
        f.ode(x + C2 * h, &yt, &mut k2);

        // Stage 3
        for i in 0..n {
            yt[i] = y[i] + h * A32 * k2[i];
        }
        f.ode(x + C3 * h, &yt, &mut k3);

        // Third order solution
        for i in 0..n {
            yt[i] = y[i] + h * (B1 * k1[i] + B2 * k2[i] + B3 * k3[i]);
        }

        // Stage 4: derivative at the new point, reused as k1 if accepted
        f.ode(x + h, &yt, &mut k4);

        evals.ode += 3;

        // Error estimate using embedded 2nd order solution
        for i in 0..n {
            ye[i] = h * (E1 * k1[i] + E2 * k2[i] + E3 * k3[i] + E4 * k4[i]);
        }

        // Error estimation
        let mut err: Float = 0.0;
        for i in 0..n {
            let tol = atol[i] + rtol[i] * yt[i].abs().max(y[i].abs());
            err += (ye[i] / tol).powi(2);
        }
        err = (err / n as Float).sqrt();
        if !err.is_finite() {
            err = Float::MAX;
        }

        if err <= 1.0 {
            // Step accepted
            steps.accepted += 1;

            // Prepare dense output
            if solout.is_some() {
                cont[0..n].copy_from_slice(y);
                for i in 0..n {
                    cont[n + i] = k1[i];
                    cont[2 * n + i] = D21 * k1[i] + D22 * k2[i] + D23 * k3[i] + D24 * k4[i];
                    cont[3 * n + i] = D31 * k1[i] + D32 * k2[i] + D33 * k3[i] + D34 * k4[i];
                }
            }

            // Update state
            y.copy_from_slice(&yt);
            k1.copy_from_slice(&k4);
            let xold = x;
            x = if last { xend } else { x + h };

            if let Some(solout) = solout.as_mut() {
                let interp = DenseOutput::new(&cont, xold, h);
                if solout.solout(xold, x, y, &interp) == ControlFlag::Interrupt {
                    status = Status::UserInterrupt;
                    break;
                }
            }

            // Normal exit
            if last {
                status = Status::Success;
                break;
            }

            // Adjust step size
            let scale = if err == 0.0 {
                scale_max
            } else {
                (safety_factor * err.powf(error_exponent))
                    .min(scale_max)
                    .max(scale_min)
            };
            h = (h * scale).abs().min(hmax) * direction;
        } else {
            // Step rejected
            steps.rejected += 1;
            h *= (safety_factor * err.powf(error_exponent))
                .min(1.0)
                .max(scale_min);
        }
    }

    Ok(IntegrationResult::new(x, h, status, evals, steps))
}

/// Dense output evaluation for RK23
pub fn contrk23(xi: Float, yi: &mut [Float], cont: &[Float], xold: Float, h: Float) {
    let n = yi.len();
    let x = if h == 0.0 { 0.0 } else { (xi - xold) / h };
    let x2 = x * x;
    let x3 = x2 * x;
    for i in 0..n {
        yi[i] = cont[i] + h * (cont[n + i] * x + cont[2 * n + i] * x2 + cont[3 * n + i] * x3);
    }
}

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
    fn interpolate(&self, ti: Float, yi: &mut [Float]) {
        contrk23(ti, yi, self.cont, self.xold, self.h);
    }
}

// RK23 Butcher tableau coefficients
const C2: Float = 0.5;
const C3: Float = 0.75;

const A21: Float = 0.5;
const A32: Float = 0.75;

const B1: Float = 2.0 / 9.0;
const B2: Float = 1.0 / 3.0;
const B3: Float = 4.0 / 9.0;

const E1: Float = 5.0 / 72.0;
const E2: Float = -1.0 / 12.0;
const E3: Float = -1.0 / 9.0;
const E4: Float = 1.0 / 8.0;

const D21: Float = -4.0 / 3.0;
const D22: Float = 1.0;
const D23: Float = 4.0 / 3.0;
const D24: Float = -1.0;
const D31: Float = 5.0 / 9.0;
const D32: Float = -2.0 / 3.0;
const D33: Float = -8.0 / 9.0;
const D34: Float = 1.0;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Decay;

    impl ODE for Decay {
        fn ode(&self, _x: Float, y: &[Float], dydx: &mut [Float]) {
            dydx[0] = -y[0];
        }
    }

    struct Samples(Vec<(Float, Float)>);

    impl SolOut for Samples {
        fn solout<I: Interpolate>(
            &mut self,
            xold: Float,
            x: Float,
            _y: &[Float],
            interpolator: &I,
        ) -> ControlFlag {
            let mid = 0.5 * (xold + x);
            let mut yi = [0.0];
            interpolator.interpolate(mid, &mut yi);
            self.0.push((mid, yi[0]));
            ControlFlag::Continue
        }
    }

    #[test]
    fn exponential_decay() {
        let mut y = [1.0];
        let res = rk23::<_, Samples>(
            &Decay,
            0.0,
            2.0,
            &mut y,
            1e-8.into(),
            1e-8.into(),
            None,
            Settings::default(),
        )
        .unwrap();
        assert_eq!(res.status, Status::Success);
        assert_eq!(res.x, 2.0);
        assert_abs_diff_eq!(y[0], (-2.0 as Float).exp(), epsilon = 1e-6);
    }

    #[test]
    fn dense_output_tracks_solution() {
        let mut y = [1.0];
        let mut samples = Samples(Vec::new());
        rk23(
            &Decay,
            0.0,
            2.0,
            &mut y,
            1e-8.into(),
            1e-8.into(),
            Some(&mut samples),
            Settings::default(),
        )
        .unwrap();
        assert!(samples.0.len() > 2);
        for (t, v) in samples.0 {
            assert_abs_diff_eq!(v, (-t).exp(), epsilon = 1e-5);
        }
    }

    #[test]
    fn interrupt_stops_integration() {
        struct StopAfterFirst;
        impl SolOut for StopAfterFirst {
            fn solout<I: Interpolate>(
                &mut self,
                xold: Float,
                x: Float,
                _y: &[Float],
                _interpolator: &I,
            ) -> ControlFlag {
                if x > xold {
                    ControlFlag::Interrupt
                } else {
                    ControlFlag::Continue
                }
            }
        }

        let mut y = [1.0];
        let res = rk23(
            &Decay,
            0.0,
            10.0,
            &mut y,
            1e-6.into(),
            1e-6.into(),
            Some(&mut StopAfterFirst),
            Settings::default(),
        )
        .unwrap();
        assert_eq!(res.status, Status::UserInterrupt);
        assert_eq!(res.steps.accepted, 1);
        assert!(res.x < 10.0);
    }
}
