//! Shift grid generation.
//!
//! The oil-pressure model is linear in `(a, c)` once the shift `b` is fixed, so
//! the fit starts with a deterministic grid search over `b` and only hands the
//! best candidate to Levenberg–Marquardt.
//!
//! Grid points are placed on the distance `d = rpm_min + b` between the lowest
//! fitted RPM and the log singularity. `d` must stay positive, and the model's
//! curvature changes on a logarithmic scale in `d`, so we space it log-uniformly.

use crate::error::AppError;

/// Smallest distance to the singularity, as a fraction of the RPM span.
const NEAR_FRACTION: f64 = 1e-3;
/// Largest distance, as a multiple of the largest RPM magnitude (almost linear model).
const FAR_MULTIPLE: f64 = 1e3;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::InvalidConfig(format!(
            "Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::InvalidConfig("Grid steps must be >= 2.".to_string()));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Candidate shifts `b` for data spanning `[rpm_min, rpm_max]`.
///
/// Every returned `b` keeps `rpm + b > 0` for all `rpm >= rpm_min`.
pub fn shift_grid(rpm_min: f64, rpm_max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    let span = rpm_max - rpm_min;
    if !(span.is_finite() && span > 0.0) {
        return Err(AppError::FitConvergence(format!(
            "RPM values span [{rpm_min}, {rpm_max}]; at least two distinct RPM values are needed"
        )));
    }
    let near = (span * NEAR_FRACTION).max(f64::EPSILON);
    let far = FAR_MULTIPLE * rpm_max.abs().max(rpm_min.abs()).max(span);

    Ok(log_space(near, far, steps)?
        .into_iter()
        .map(|d| d - rpm_min)
        .collect())
}
