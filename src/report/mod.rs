//! Reporting utilities: the generated-function report, terminal summaries and
//! parsing of previously generated reports.

pub mod format;
pub mod parse;

pub use format::*;
pub use parse::*;
