//! Evaluation of the logarithmic oil-pressure model.
//!
//! `oilp(rpm) = a * ln(rpm + b) + c`
//!
//! The fitter relies on three primitive operations:
//! - predict `oilp` for given parameters (residuals/plots/reports)
//! - build a design row for a fixed shift `b` (linear solve for `a`, `c`)
//! - the Jacobian row w.r.t. `(a, b, c)` (Levenberg–Marquardt)
//!
//! The model is only defined for `rpm + b > 0`; outside it every primitive
//! reports failure instead of producing a NaN that leaks into a solve.

/// Predict oil pressure. Returns NaN when `rpm + b <= 0`.
pub fn predict(rpm: f64, a: f64, b: f64, c: f64) -> f64 {
    let shifted = rpm + b;
    if shifted <= 0.0 {
        return f64::NAN;
    }
    a * shifted.ln() + c
}

/// `true` when every sample keeps `rpm + b` strictly positive.
pub fn in_domain(rpm: &[f64], b: f64) -> bool {
    rpm.iter().all(|&r| r + b > 0.0)
}

/// Design row `[ln(rpm + b), 1]` for the linear parameters `(a, c)`.
pub fn design_row(rpm: f64, b: f64) -> Option<[f64; 2]> {
    let shifted = rpm + b;
    if shifted <= 0.0 {
        return None;
    }
    Some([shifted.ln(), 1.0])
}

/// Partial derivatives `[∂f/∂a, ∂f/∂b, ∂f/∂c]` at `rpm`.
pub fn jacobian_row(rpm: f64, a: f64, b: f64) -> Option<[f64; 3]> {
    let shifted = rpm + b;
    if shifted <= 0.0 {
        return None;
    }
    Some([shifted.ln(), a / shifted, 1.0])
}
