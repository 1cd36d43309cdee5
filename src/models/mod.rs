//! Oil-pressure model implementation.
//!
//! The model is implemented as small, pure functions so that the fitting code
//! and the plotting/report code share one definition.

pub mod model;

pub use model::*;
