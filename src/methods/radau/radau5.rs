//! Radau5 - 3-stage, order-5 Radau IIA implicit Runge–Kutta solver.
//!
//! Solves stiff systems `y' = f(x, y)` with adaptive step-size, simplified
//! Newton iterations on the transformed stage equations and dense output.
//!
//! Reference
//! - E. Hairer and G. Wanner, "Solving Ordinary Differential Equations II.
//!   Stiff and Differential-Algebraic Problems", 2nd ed., Springer (1996).
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
    matrix::Matrix,
    methods::{
        result::{Evals, IntegrationResult, Steps},
        settings::{Settings, Tolerance},
    },
};

/// Radau IIA(5) implicit Runge–Kutta with adaptive steps and dense output.
///
/// Integrates `y' = f(x, y)` from `x` to `xend`, advancing `y` in-place. The
/// Jacobian comes from [`ODE::jac`] once per step attempt and both stage
/// systems are factored once and reused by every Newton iteration.
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
///   `scale_max = 8.0`, `hmax = |xend - x|`, `h0 = 1e-6`, `nmax = 100_000`,
///   `newton_maxiter = 7`, `newton_tol` derived from `rtol`.
pub fn radau5<F, S>(
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

    let uround = match settings.uround {
        Some(u) => {
            if u <= 1e-35 || u >= 1.0 {
                errors.push(Error::URoundOutOfRange(u));
            }
            u
        }
        None => 2.3e-16,
    };

    let safety_factor = match settings.safety_factor {
        Some(f) => {
            if f >= 1.0 || f <= 1e-4 {
                errors.push(Error::SafetyFactorOutOfRange(f));
            }
            f
        }
        None => 0.9,
    };

    // hnew / h stays within [scale_min, scale_max]
    let scale_min = settings.scale_min.unwrap_or(0.2);
    let scale_max = settings.scale_max.unwrap_or(8.0);
    if scale_min <= 0.0 || scale_max <= scale_min {
        errors.push(Error::InvalidScaleFactors(scale_min, scale_max));
    }
    let facc1 = 1.0 / scale_min;
    let facc2 = 1.0 / scale_max;

    let h_max = match settings.hmax {
        Some(h) => {
            if !(h.is_finite() && h > 0.0) {
                errors.push(Error::InvalidStepSize(h));
            }
            h.abs()
        }
        None => (xend - x).abs(),
    };

    let nmax = match settings.nmax {
        Some(n) => {
            if n == 0 {
                errors.push(Error::NMaxMustBePositive(n));
            }
            n
        }
        None => 100_000,
    };

    let nit = match settings.newton_maxiter {
        Some(n) => {
            if n == 0 {
                errors.push(Error::NewtonMaxIterMustBePositive(n));
            }
            n
        }
        None => 7,
    };

    if let Some(t) = settings.newton_tol {
        if t <= uround || t >= 1.0 {
            errors.push(Error::NewtonTolOutOfRange(t));
        }
    }

    if let Some(h0) = settings.h0 {
        if !(h0.is_finite() && h0 != 0.0) {
            errors.push(Error::InvalidStepSize(h0));
        }
    }

    let n = y.len();
    for tol in [&rtol, &atol] {
        if let Some(v) = tol.first_invalid() {
            errors.push(Error::InvalidTolerance(v));
        }
        if let Some(got) = tol.len_mismatch(n) {
            errors.push(Error::ToleranceDimension { expected: n, got });
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // The embedded estimate is of order 3: tighten the tolerances so that the
    // delivered accuracy tracks the requested one.
    let mut rtol_t = vec![0.0; n];
    let mut atol_t = vec![0.0; n];
    for i in 0..n {
        let quot = atol[i] / rtol[i];
        rtol_t[i] = 0.1 * rtol[i].powf(2.0 / 3.0);
        atol_t[i] = rtol_t[i] * quot;
    }
    let rtol_min = rtol_t.iter().copied().fold(Float::INFINITY, Float::min);

    let fnewt = settings
        .newton_tol
        .unwrap_or_else(|| (10.0 * uround / rtol_min).max(rtol_min.sqrt().min(0.03)));

    // --- Declarations ---
    let mut f0 = vec![0.0; n];
    let mut k1 = vec![0.0; n];
    let mut k2 = vec![0.0; n];
    let mut k3 = vec![0.0; n];
    let mut z1 = vec![0.0; n];
    let mut z2 = vec![0.0; n];
    let mut z3 = vec![0.0; n];
    let mut w1 = vec![0.0; n];
    let mut w2 = vec![0.0; n];
    let mut w3 = vec![0.0; n];
    let mut ys = vec![0.0; n];
    let mut df1 = vec![0.0; n];
    let mut df23 = vec![0.0; 2 * n];
    let mut y1 = vec![0.0; n];
    let mut scal = vec![0.0; n];
    let mut tmp = vec![0.0; n];
    let mut err_v = vec![0.0; n];
    // [y_{n+1}, c1, c2, c3]
    let mut cont = vec![0.0; n * 4];
    let mut jac = Matrix::zeros(n);
    let mut e1 = Matrix::zeros(n);
    let mut e2 = Matrix::zeros(2 * n);
    let mut evals = Evals::new();
    let mut steps = Steps::new();
    let mut faccon: Float = 1.0;
    let mut first = true;
    let mut reject = false;
    let mut last = false;
    let status;
    let cfac = safety_factor * (1 + 2 * nit) as Float;
    let posneg = if xend >= x { 1.0 } else { -1.0 };

    // --- Initializations ---
    f.ode(x, y, &mut f0);
    evals.ode += 1;
    let mut h = settings.h0.map_or(1.0e-6, Float::abs).min(h_max) * posneg;

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
        if steps.total >= nmax {
            status = Status::NeedLargerNMax;
            break;
        }

        if 0.1 * h.abs() <= x.abs() * uround {
            status = Status::StepSizeTooSmall;
            break;
        }

        if (x + 1.01 * h - xend) * posneg > 0.0 {
            h = xend - x;
            last = true;
        }

        steps.total += 1;

        f.jac(x, y, &mut jac);
        for i in 0..n {
            scal[i] = atol_t[i] + rtol_t[i] * y[i].abs();
        }

        // E1 = (U1/h) I - J, and the complex pair (ALPH + i BETA)/h I - J as a
        // real 2n x 2n block
        let fac1 = U1 / h;
        let alphn = ALPH / h;
        let betan = BETA / h;
        for r in 0..n {
            for c in 0..n {
                let id = if r == c { 1.0 } else { 0.0 };
                e1[(r, c)] = id * fac1 - jac[(r, c)];
                let e2r = id * alphn - jac[(r, c)];
                let e2i = id * betan;
                e2[(r, c)] = e2r;
                e2[(r, c + n)] = -e2i;
                e2[(r + n, c)] = e2i;
                e2[(r + n, c + n)] = e2r;
            }
        }
        let (lu1, lu2) = match (e1.lu(), e2.lu()) {
            (Ok(lu1), Ok(lu2)) => (lu1, lu2),
            _ => {
                h *= 0.5;
                steps.rejected += 1;
                reject = true;
                last = false;
                continue;
            }
        };

        // --- Simplified Newton iteration on the transformed stages W ---
        z1.fill(0.0);
        z2.fill(0.0);
        z3.fill(0.0);
        w1.fill(0.0);
        w2.fill(0.0);
        w3.fill(0.0);
        faccon = faccon.max(uround).powf(0.8);
        let mut newt = 0;
        let mut dynold: Float = 0.0;
        let mut thqold: Float = 0.0;
        let newton: Result<(), Float> = loop {
            if newt >= nit {
                break Err(0.5);
            }

            for i in 0..n {
                ys[i] = y[i] + z1[i];
            }
            f.ode(x + C1 * h, &ys, &mut k1);
            for i in 0..n {
                ys[i] = y[i] + z2[i];
            }
            f.ode(x + C2 * h, &ys, &mut k2);
            for i in 0..n {
                ys[i] = y[i] + z3[i];
            }
            f.ode(x + h, &ys, &mut k3);
            evals.ode += 3;

            // rhs = T^{-1} K - (Lambda / h) W
            for i in 0..n {
                df1[i] = TI11 * k1[i] + TI12 * k2[i] + TI13 * k3[i] - fac1 * w1[i];
                df23[i] = TI21 * k1[i] + TI22 * k2[i] + TI23 * k3[i] - alphn * w2[i]
                    + betan * w3[i];
                df23[i + n] = TI31 * k1[i] + TI32 * k2[i] + TI33 * k3[i]
                    - betan * w2[i]
                    - alphn * w3[i];
            }
            lu1.solve_mut(&mut df1);
            lu2.solve_mut(&mut df23);
            newt += 1;

            let mut dyno: Float = 0.0;
            for i in 0..n {
                let v1 = df1[i] / scal[i];
                let v2 = df23[i] / scal[i];
                let v3 = df23[i + n] / scal[i];
                dyno += v1 * v1 + v2 * v2 + v3 * v3;
            }
            let dyno = (dyno / (3 * n) as Float).sqrt();

            // Convergence rate; give up early when the remaining iterations
            // cannot reach the tolerance.
            if newt > 1 && newt < nit {
                let thetq = dyno / dynold;
                let theta = if newt == 2 { thetq } else { (thetq * thqold).sqrt() };
                thqold = thetq;
                if theta < 0.99 {
                    faccon = theta / (1.0 - theta);
                    let dyth = faccon * dyno * theta.powi((nit - 1 - newt) as i32) / fnewt;
                    if dyth >= 1.0 {
                        let qnewt = dyth.clamp(1.0e-4, 20.0);
                        break Err(0.8 * qnewt.powf(-1.0 / (4 + nit - 1 - newt) as Float));
                    }
                } else {
                    break Err(0.5);
                }
            }
            dynold = dyno.max(uround);

            for i in 0..n {
                w1[i] += df1[i];
                w2[i] += df23[i];
                w3[i] += df23[i + n];
                z1[i] = T11 * w1[i] + T12 * w2[i] + T13 * w3[i];
                z2[i] = T21 * w1[i] + T22 * w2[i] + T23 * w3[i];
                z3[i] = T31 * w1[i] + w2[i];
            }

            if faccon * dyno <= fnewt {
                break Ok(());
            }
        };

        if let Err(hfac) = newton {
            h *= hfac;
            steps.rejected += 1;
            reject = true;
            last = false;
            continue;
        }

        // --- Error estimation ---
        for i in 0..n {
            y1[i] = y[i] + z3[i];
            tmp[i] = (DD1 * z1[i] + DD2 * z2[i] + DD3 * z3[i]) / h;
            err_v[i] = f0[i] + tmp[i];
        }
        lu1.solve_mut(&mut err_v);
        let mut err = scaled_norm(&err_v, &scal);

        if err >= 1.0 && (first || reject) {
            for i in 0..n {
                ys[i] = y[i] + err_v[i];
            }
            f.ode(x, &ys, &mut k1);
            evals.ode += 1;
            for i in 0..n {
                err_v[i] = k1[i] + tmp[i];
            }
            lu1.solve_mut(&mut err_v);
            err = scaled_norm(&err_v, &scal);
        }

        // Fewer Newton iterations allow a larger step
        let fac = safety_factor.min(cfac / (newt + 2 * nit) as Float);
        let quot = facc2.max(facc1.min(err.powf(0.25) / fac));
        let mut hnew = h / quot;

        if err < 1.0 {
            // Step accepted
            first = false;
            steps.accepted += 1;

            for i in 0..n {
                let c1 = (z2[i] - z3[i]) / C2M1;
                let ak = (z1[i] - z2[i]) / C1MC2;
                let acont3 = (ak - z1[i] / C1) / C2;
                let c2 = (ak - c1) / C1M1;
                cont[i] = y1[i];
                cont[n + i] = c1;
                cont[2 * n + i] = c2;
                cont[3 * n + i] = c2 - acont3;
            }

            y.copy_from_slice(&y1);
            let xold = x;
            x = if last { xend } else { x + h };
            f.ode(x, y, &mut f0);
            evals.ode += 1;

            if let Some(solout) = solout.as_mut() {
                let interpolator = DenseOutput::new(&cont, xold, h);
                if solout.solout(xold, x, y, &interpolator) == ControlFlag::Interrupt {
                    status = Status::UserInterrupt;
                    break;
                }
            }

            if last {
                h = hnew;
                status = Status::Success;
                break;
            }

            hnew = posneg * hnew.abs().min(h_max);
            if reject {
                hnew = posneg * hnew.abs().min(h.abs());
                reject = false;
            }
            h = hnew;
        } else {
            // Step rejected
            reject = true;
            last = false;
            steps.rejected += 1;
            h = if first { h * 0.1 } else { hnew };
        }
    }

    Ok(IntegrationResult::new(x, h, status, evals, steps))
}

fn scaled_norm(v: &[Float], scal: &[Float]) -> Float {
    let sum: Float = v.iter().zip(scal).map(|(e, s)| (e / s) * (e / s)).sum();
    let norm = (sum / v.len() as Float).sqrt();
    // a NaN estimate must reject the step
    if norm.is_nan() { Float::INFINITY } else { norm.max(1.0e-10) }
}

/// Continuous output function for Radau5: cubic collocation polynomial
/// anchored at the right end of the step.
pub fn contr5(xi: Float, yi: &mut [Float], cont: &[Float], xold: Float, h: Float) {
    let n = cont.len() / 4;
    let s = if h == 0.0 { 0.0 } else { (xi - (xold + h)) / h };
    for i in 0..n {
        yi[i] = cont[i]
            + s * (cont[n + i] + (s - C2M1) * (cont[2 * n + i] + (s - C1M1) * cont[3 * n + i]));
    }
}

/// Dense output interpolator for Radau5
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

impl Interpolate for DenseOutput<'_> {
    fn interpolate(&self, xi: Float, yi: &mut [Float]) {
        contr5(xi, yi, self.cont, self.xold, self.h);
    }
}

// Collocation nodes; the third is 1
const C1: Float = 0.155_051_025_721_682_2;
const C2: Float = 0.644_948_974_278_317_8;
const C1M1: Float = C1 - 1.0;
const C2M1: Float = C2 - 1.0;
const C1MC2: Float = C1 - C2;

// Embedded error estimate
const DD1: Float = -10.048_809_399_827_416;
const DD2: Float = 1.382_142_733_160_749;
const DD3: Float = -0.333_333_333_333_333_3;

// Eigenvalues of A^{-1}: one real, one complex pair
const U1: Float = 3.637_834_252_744_496;
const ALPH: Float = 2.681_082_873_627_752_3;
const BETA: Float = 3.050_430_199_247_410_5;

// T with T^{-1} A^{-1} T block diagonal (T32 = 1, T33 = 0)
const T11: Float = 9.123_239_487_089_295E-2;
const T12: Float = -1.412_552_950_209_542E-1;
const T13: Float = -3.002_919_410_514_742_4E-2;
const T21: Float = 2.417_179_327_071_07E-1;
const T22: Float = 2.041_293_522_937_999_4E-1;
const T23: Float = 3.829_421_127_572_619E-1;
const T31: Float = 9.660_481_826_150_93E-1;

const TI11: Float = 4.325_579_890_063_155;
const TI12: Float = 3.391_992_518_158_098_4E-1;
const TI13: Float = 5.417_705_399_358_749E-1;
const TI21: Float = -4.178_718_591_551_905;
const TI22: Float = -3.276_828_207_610_623_7E-1;
const TI23: Float = 4.766_235_545_005_504_4E-1;
const TI31: Float = -5.028_726_349_457_868E-1;
const TI32: Float = 2.571_926_949_855_605;
const TI33: Float = -5.960_392_048_282_249E-1;
