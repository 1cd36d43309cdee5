//! Numerical building blocks: linear least squares and Levenberg–Marquardt.

pub mod lm;
pub mod ols;

pub use lm::{Linearization, LmOutcome, LmSettings, minimize};
pub use ols::*;
