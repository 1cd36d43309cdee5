//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the loaded log table (`LogTable`, `Channel`)
//! - fit inputs and outputs (`OilSamples`, `FitParams`, `FitResult`)
//! - run configuration (`LoadConfig`, `FitConfig`)

pub mod types;

pub use types::*;
