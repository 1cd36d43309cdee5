//! Ordinary least squares solver.
//!
//! For a fixed shift `b` the oil-pressure model is linear in `(a, c)`:
//!
//! ```text
//! minimize Σ (y_i - a·ln(rpm_i + b) - c)^2
//! ```
//!
//! so the shift grid search solves one small regression per grid point.
//!
//! Implementation choices:
//! - We use SVD so the tall (n × 2) design matrix is solved robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Very large shifts make `ln(rpm + b)` almost constant, i.e. nearly
//!   collinear with the intercept column; the tolerance ladder below keeps
//!   those candidates solvable instead of discarding them.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
