//! `darab-curves` library crate.
//!
//! Two pipelines over WinDarab text exports:
//!
//! - load a log, label its columns and preview it (`darab load`)
//! - fit `oilp = a * ln(rpm + b) + c` above an RPM bound and emit a chart plus
//!   a report with the fitted function as code (`darab fit`)
//!
//! The binary (`darab`) is a thin wrapper around [`app::run`].

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
