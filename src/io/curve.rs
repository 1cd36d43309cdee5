//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted curve:
//! - model parameters `(a, b, c)` and fit quality
//! - run metadata (source log, RPM bound)
//! - a precomputed fitted grid for quick plotting elsewhere
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveFile, CurveGrid, FitResult};
use crate::error::AppError;
use crate::fit::linear_grid;
use crate::io::export::StagedFile;

/// Points in the exported grid.
pub const GRID_POINTS: usize = 101;

/// Build the curve document for a fit over `[rpm_lower_bound, rpm_max]`.
pub fn build_curve_file(fit: &FitResult, source: &Path, rpm_lower_bound: f64, rpm_max: f64) -> CurveFile {
    let (rpm, oilp) = linear_grid(&fit.params, rpm_lower_bound, rpm_max, GRID_POINTS);
    CurveFile {
        tool: "darab".to_string(),
        source: source.to_path_buf(),
        rpm_lower_bound,
        params: fit.params,
        fit_quality: fit.quality.clone(),
        grid: CurveGrid { rpm, oilp },
    }
}

/// Serialize a curve document into a staged output.
pub fn write_curve_json(staged: &mut StagedFile, curve: &CurveFile) -> Result<(), AppError> {
    let target = staged.target().to_path_buf();
    serde_json::to_writer_pretty(staged.as_file_mut(), curve)
        .map_err(|e| AppError::io(&target, std::io::Error::other(e)))
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|e| AppError::from_open(path, e))?;
    serde_json::from_reader(file).map_err(|e| AppError::data_format(path, format!("invalid curve JSON: {e}")))
}
