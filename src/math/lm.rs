//! Levenberg–Marquardt for small nonlinear least-squares problems.
//!
//! We minimize `Σ r_i(p)^2` with `r_i = y_i - f(x_i; p)`. Each iteration solves
//! the damped normal equations
//!
//! ```text
//! (JᵀJ + λ·diag(JᵀJ)) δ = Jᵀr
//! ```
//!
//! where `J` is the Jacobian of `f` (not of `r`). Accepted steps shrink `λ`,
//! rejected ones grow it. Marquardt's diagonal scaling keeps parameters of very
//! different magnitudes (a log coefficient vs an RPM shift) on equal footing.
//!
//! The caller's evaluator returns `None` for parameters outside the model's
//! domain; such trial steps are rejected like any step that increases the SSE.

use nalgebra::{DMatrix, DVector};

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 10.0;
const LAMBDA_MAX: f64 = 1e16;
/// Floor for zero diagonal entries of `JᵀJ`.
const DIAG_FLOOR: f64 = 1e-12;

/// Stopping rules.
#[derive(Debug, Clone, Copy)]
pub struct LmSettings {
    pub max_iterations: usize,
    /// Relative SSE reduction / relative step size considered converged.
    pub tolerance: f64,
}

impl Default for LmSettings {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-12,
        }
    }
}

/// Result of a minimization.
#[derive(Debug, Clone)]
pub struct LmOutcome {
    pub params: DVector<f64>,
    pub sse: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Residuals `r = y - f` and Jacobian `∂f/∂p` at some parameter vector.
pub struct Linearization {
    pub residuals: DVector<f64>,
    pub jacobian: DMatrix<f64>,
}

/// Minimize from `start`.
///
/// Returns `None` when the evaluator rejects the starting point itself.
pub fn minimize<F>(start: DVector<f64>, settings: LmSettings, mut eval: F) -> Option<LmOutcome>
where
    F: FnMut(&DVector<f64>) -> Option<Linearization>,
{
    let mut params = start;
    let mut lin = eval(&params)?;
    let mut sse = lin.residuals.norm_squared();
    if !sse.is_finite() {
        return None;
    }

    let mut lambda = LAMBDA_INIT;
    let mut iterations = 0usize;

    while iterations < settings.max_iterations {
        iterations += 1;

        let jt = lin.jacobian.transpose();
        let jtj = &jt * &lin.jacobian;
        let jtr = &jt * &lin.residuals;

        if sse == 0.0 || jtr.amax() == 0.0 {
            return Some(LmOutcome {
                params,
                sse,
                iterations,
                converged: true,
            });
        }

        // Inner loop: grow λ until a step decreases the SSE.
        let accepted = loop {
            let mut damped = jtj.clone();
            for k in 0..damped.nrows() {
                damped[(k, k)] += lambda * jtj[(k, k)].max(DIAG_FLOOR);
            }

            let step = damped.cholesky().map(|chol| chol.solve(&jtr));
            if let Some(step) = step.filter(|s| s.iter().all(|v| v.is_finite())) {
                let trial = &params + &step;
                if let Some(trial_lin) = eval(&trial) {
                    let trial_sse = trial_lin.residuals.norm_squared();
                    if trial_sse.is_finite() && trial_sse < sse {
                        break Some((trial, trial_lin, trial_sse, step));
                    }
                }
            }

            lambda *= LAMBDA_UP;
            if lambda > LAMBDA_MAX {
                break None;
            }
        };

        let Some((trial, trial_lin, trial_sse, step)) = accepted else {
            // No descent direction left at any damping: we sit at a minimum.
            return Some(LmOutcome {
                params,
                sse,
                iterations,
                converged: true,
            });
        };

        let reduction = sse - trial_sse;
        let small_reduction = reduction <= settings.tolerance * sse;
        let small_step = step.norm() <= settings.tolerance * (params.norm() + settings.tolerance);

        params = trial;
        lin = trial_lin;
        sse = trial_sse;
        lambda = (lambda / LAMBDA_DOWN).max(f64::EPSILON);

        if small_reduction || small_step {
            return Some(LmOutcome {
                params,
                sse,
                iterations,
                converged: true,
            });
        }
    }

    Some(LmOutcome {
        params,
        sse,
        iterations,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exponential decay `y = p0 * exp(-p1 x)`.
    fn exp_problem(xs: &[f64], ys: &[f64], p: &DVector<f64>) -> Option<Linearization> {
        let n = xs.len();
        let mut residuals = DVector::zeros(n);
        let mut jacobian = DMatrix::zeros(n, 2);
        for i in 0..n {
            let e = (-p[1] * xs[i]).exp();
            residuals[i] = ys[i] - p[0] * e;
            jacobian[(i, 0)] = e;
            jacobian[(i, 1)] = -p[0] * xs[i] * e;
        }
        Some(Linearization { residuals, jacobian })
    }

    #[test]
    fn recovers_exact_exponential() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * (-0.7 * x).exp()).collect();

        let out = minimize(
            DVector::from_vec(vec![1.0, 0.1]),
            LmSettings::default(),
            |p| exp_problem(&xs, &ys, p),
        )
        .unwrap();

        assert!(out.converged);
        assert!((out.params[0] - 3.0).abs() < 1e-6, "{}", out.params);
        assert!((out.params[1] - 0.7).abs() < 1e-6, "{}", out.params);
    }

    #[test]
    fn rejected_start_returns_none() {
        let out = minimize(DVector::from_vec(vec![0.0]), LmSettings::default(), |_| None);
        assert!(out.is_none());
    }

    #[test]
    fn reports_non_convergence_when_budget_is_exhausted() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * (-0.7 * x).exp()).collect();
        let settings = LmSettings {
            max_iterations: 1,
            tolerance: 0.0,
        };
        let out = minimize(DVector::from_vec(vec![1.0, 0.1]), settings, |p| {
            exp_problem(&xs, &ys, p)
        })
        .unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 1);
    }
}
