//! Dense evaluation of a fitted curve for plotting and export.

use crate::domain::FitParams;

/// Upper bound on generated curve points; the step widens beyond it.
pub const MAX_CURVE_POINTS: usize = 20_000;

/// RPM values `start, start + step, ...` strictly below `stop`.
///
/// `step` is widened when the range would produce more than
/// [`MAX_CURVE_POINTS`] values. An empty or inverted range yields no points.
pub fn rpm_range(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(start.is_finite() && stop.is_finite() && step.is_finite()) || step <= 0.0 || stop <= start {
        return Vec::new();
    }
    let span = stop - start;
    let step = step.max(span / MAX_CURVE_POINTS as f64);
    let count = (span / step).ceil() as usize;

    (0..count)
        .map(|i| start + step * i as f64)
        .filter(|&rpm| rpm < stop)
        .collect()
}

/// `(rpm, oilp)` points of the fitted curve between `start` and `stop`.
///
/// Points where the model is undefined are dropped.
pub fn curve_points(params: &FitParams, start: f64, stop: f64, step: f64) -> Vec<(f64, f64)> {
    rpm_range(start, stop, step)
        .into_iter()
        .map(|rpm| (rpm, params.predict(rpm)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}

/// Scale every value of a curve by `percent / 100`.
pub fn scaled(points: &[(f64, f64)], percent: f64) -> Vec<(f64, f64)> {
    let factor = percent / 100.0;
    points.iter().map(|&(x, y)| (x, y * factor)).collect()
}

/// `n` evenly spaced points between `start` and `stop` (inclusive).
pub fn linear_grid(params: &FitParams, start: f64, stop: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let mut rpm = Vec::with_capacity(n);
    let mut oilp = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let r = start + u * (stop - start);
        rpm.push(r);
        oilp.push(params.predict(r));
    }
    (rpm, oilp)
}
