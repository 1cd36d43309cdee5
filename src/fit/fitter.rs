//! Nonlinear least-squares fit of `oilp = a * ln(rpm + b) + c`.
//!
//! Given filtered `(rpm, oilp)` samples we:
//! - evaluate every shift `b` of a log-spaced grid (parallel), solving the
//!   linear `(a, c)` by OLS and scoring the SSE
//! - take the lowest-SSE candidate as the seed
//! - refine `(a, b, c)` jointly with Levenberg–Marquardt
//!
//! Any failure to produce finite, in-domain parameters is reported as
//! `AppError::FitConvergence`.

use log::debug;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{FitParams, FitQuality, FitResult, OilSamples};
use crate::error::AppError;
use crate::fit::shift_grid::shift_grid;
use crate::math::{Linearization, LmSettings, minimize, solve_least_squares};
use crate::models::{design_row, in_domain, jacobian_row};

/// The model has three free parameters.
pub const PARAM_COUNT: usize = 3;

/// Options that affect how the model is calibrated.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Number of shift values in the seed grid.
    pub shift_steps: usize,
    /// Levenberg–Marquardt stopping rules.
    pub lm: LmSettings,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            shift_steps: 200,
            lm: LmSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: FitParams,
    sse: f64,
}

/// Fit the model to `samples` (already filtered by the RPM bound).
pub fn fit_log_model(samples: &OilSamples, opts: &FitOptions) -> Result<FitResult, AppError> {
    let n = samples.len();
    if n < PARAM_COUNT {
        return Err(AppError::FitConvergence(format!(
            "{n} sample(s) above the RPM bound; at least {PARAM_COUNT} are needed"
        )));
    }
    if samples.oilp.len() != n {
        return Err(AppError::FitConvergence(
            "RPM and oil-pressure series differ in length".to_string(),
        ));
    }
    if samples.points().any(|(r, y)| !(r.is_finite() && y.is_finite())) {
        return Err(AppError::FitConvergence("non-finite sample values".to_string()));
    }

    let (Some(rpm_min), Some(rpm_max)) = (samples.rpm_min(), samples.rpm_max()) else {
        return Err(AppError::FitConvergence("no samples to fit".to_string()));
    };

    let grid = shift_grid(rpm_min, rpm_max, opts.shift_steps)?;
    let seed = best_seed(&grid, &samples.rpm, &samples.oilp)?;
    debug!(
        "Shift grid seed: a={:.6} b={:.6} c={:.6} (SSE={:.6}, {} grid points)",
        seed.params.a,
        seed.params.b,
        seed.params.c,
        seed.sse,
        grid.len()
    );

    let (params, sse, iterations) = refine(&seed, &samples.rpm, &samples.oilp, opts.lm)?;
    debug!("Levenberg–Marquardt converged after {iterations} iteration(s), SSE={sse:.6}");

    Ok(FitResult {
        params,
        quality: FitQuality {
            n,
            sse,
            rmse: (sse / n as f64).sqrt(),
            iterations,
        },
    })
}

fn best_seed(grid: &[f64], rpm: &[f64], oilp: &[f64]) -> Result<Candidate, AppError> {
    // Evaluate each shift independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &b)| {
            evaluate_shift(b, rpm, oilp).map(|(params, sse)| Candidate { idx, params, sse })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::FitConvergence(
            "no shift in the seed grid produced a finite least-squares solution".to_string(),
        ));
    }

    // Deterministic selection: pick the minimum SSE; break ties by grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }
    Ok(best.clone())
}

fn evaluate_shift(b: f64, rpm: &[f64], oilp: &[f64]) -> Option<(FitParams, f64)> {
    let n = rpm.len();
    let mut x = DMatrix::<f64>::zeros(n, 2);
    for (i, &r) in rpm.iter().enumerate() {
        let row = design_row(r, b)?;
        x[(i, 0)] = row[0];
        x[(i, 1)] = row[1];
    }
    let y = DVector::from_column_slice(oilp);

    let beta = solve_least_squares(&x, &y)?;
    let params = FitParams::new(beta[0], b, beta[1]);
    let sse = sum_squared_residuals(&params, rpm, oilp);

    if sse.is_finite() { Some((params, sse)) } else { None }
}

fn refine(
    seed: &Candidate,
    rpm: &[f64],
    oilp: &[f64],
    settings: LmSettings,
) -> Result<(FitParams, f64, usize), AppError> {
    let start = DVector::from_vec(vec![seed.params.a, seed.params.b, seed.params.c]);

    let outcome = minimize(start, settings, |p| linearize(p, rpm, oilp)).ok_or_else(|| {
        AppError::FitConvergence("seed parameters fall outside the model's domain".to_string())
    })?;

    if !outcome.converged {
        return Err(AppError::FitConvergence(format!(
            "Levenberg–Marquardt did not converge within {} iterations (SSE={:.6})",
            outcome.iterations, outcome.sse
        )));
    }

    let params = FitParams::new(outcome.params[0], outcome.params[1], outcome.params[2]);
    if !params.is_finite() || !outcome.sse.is_finite() {
        return Err(AppError::FitConvergence(format!(
            "fit produced non-finite parameters ({params:?})"
        )));
    }
    if !in_domain(rpm, params.b) {
        return Err(AppError::FitConvergence(format!(
            "fitted shift b={} leaves ln(rpm + b) undefined for some samples",
            params.b
        )));
    }

    Ok((params, outcome.sse, outcome.iterations))
}

fn linearize(p: &DVector<f64>, rpm: &[f64], oilp: &[f64]) -> Option<Linearization> {
    let (a, b, c) = (p[0], p[1], p[2]);
    let n = rpm.len();
    let mut residuals = DVector::zeros(n);
    let mut jacobian = DMatrix::zeros(n, PARAM_COUNT);

    for i in 0..n {
        let row = jacobian_row(rpm[i], a, b)?;
        residuals[i] = oilp[i] - (a * row[0] + c);
        for (j, v) in row.iter().enumerate() {
            jacobian[(i, j)] = *v;
        }
    }
    Some(Linearization { residuals, jacobian })
}

/// `Σ (oilp - f(rpm))^2` for the given parameters.
pub fn sum_squared_residuals(params: &FitParams, rpm: &[f64], oilp: &[f64]) -> f64 {
    rpm.iter()
        .zip(oilp.iter())
        .map(|(&r, &y)| {
            let e = y - params.predict(r);
            e * e
        })
        .sum()
}
