//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate the shift grid used to seed the fit
//! - evaluate each candidate shift (parallel) and refine the best one
//! - evaluate the fitted curve densely for charts and exports

pub mod curve;
pub mod fitter;
pub mod shift_grid;

pub use curve::*;
pub use fitter::*;
pub use shift_grid::*;
