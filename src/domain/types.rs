//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built once per run by the loader / fitter
//! - rendered into charts and reports
//! - exported to JSON (`CurveFile`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Number of header lines written by WinDarab's "export text" before the data.
pub const HEADER_LINES: usize = 6;

/// Column layout of a full engine log export.
pub const DEFAULT_LOG_LABELS: [&str; 5] = ["Time", "Engine Temp", "Oil Temp", "Oil Pressure", "RPM"];

/// Column layout of an oil-pressure/RPM-only export (the tool writes oil pressure first).
pub const DEFAULT_FIT_LABELS: [&str; 3] = ["Time", "Oil Pressure", "RPM"];

/// One labelled signal channel of a log.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub label: String,
    pub values: Vec<f64>,
}

/// A loaded log: a time index plus one column per remaining label.
///
/// Invariants (enforced by `io::ingest`):
/// - every channel has exactly `time.len()` values
/// - `time` is non-decreasing
/// - labels are unique
#[derive(Debug, Clone, PartialEq)]
pub struct LogTable {
    pub time_label: String,
    pub time: Vec<f64>,
    pub channels: Vec<Channel>,
}

impl LogTable {
    /// Number of samples (rows).
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Non-index column labels, in file order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.label.as_str())
    }

    /// Look a channel up by its label (exact match).
    pub fn channel(&self, label: &str) -> Option<&[f64]> {
        self.channels
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.values.as_slice())
    }

    /// Named lookup that turns a missing label into a descriptive error.
    pub fn require_channel(&self, label: &str, source: &Path) -> Result<&[f64], AppError> {
        self.channel(label).ok_or_else(|| {
            let known: Vec<&str> = self.labels().collect();
            AppError::data_format(
                source,
                format!("no column labelled `{label}` (columns: {})", known.join(", ")),
            )
        })
    }
}

/// Aligned `(rpm, oil pressure)` observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OilSamples {
    pub rpm: Vec<f64>,
    pub oilp: Vec<f64>,
}

impl OilSamples {
    /// Pull the RPM and oil-pressure channels out of a table by name.
    pub fn from_table(
        table: &LogTable,
        rpm_column: &str,
        oilp_column: &str,
        source: &Path,
    ) -> Result<Self, AppError> {
        let rpm = table.require_channel(rpm_column, source)?.to_vec();
        let oilp = table.require_channel(oilp_column, source)?.to_vec();
        Ok(Self { rpm, oilp })
    }

    pub fn len(&self) -> usize {
        self.rpm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rpm.is_empty()
    }

    /// Samples whose RPM strictly exceeds `lower_bound`.
    pub fn above(&self, lower_bound: f64) -> Self {
        let (rpm, oilp) = self
            .rpm
            .iter()
            .zip(self.oilp.iter())
            .filter(|(rpm, _)| **rpm > lower_bound)
            .map(|(&rpm, &oilp)| (rpm, oilp))
            .unzip();
        Self { rpm, oilp }
    }

    pub fn rpm_min(&self) -> Option<f64> {
        self.rpm.iter().copied().reduce(f64::min)
    }

    pub fn rpm_max(&self) -> Option<f64> {
        self.rpm.iter().copied().reduce(f64::max)
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rpm.iter().copied().zip(self.oilp.iter().copied())
    }
}

/// Fitted parameters of `oilp = a * ln(rpm + b) + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl FitParams {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Predicted oil pressure at `rpm`. NaN outside the domain (`rpm + b <= 0`).
    pub fn predict(&self, rpm: f64) -> f64 {
        crate::models::predict(rpm, self.a, self.b, self.c)
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub n: usize,
    pub sse: f64,
    pub rmse: f64,
    /// Levenberg–Marquardt iterations spent after the grid seed.
    pub iterations: usize,
}

/// Fit output: parameters plus diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub params: FitParams,
    pub quality: FitQuality,
}

/// Image format of a chart output, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// PNG / JPEG / BMP through the bitmap backend.
    Bitmap,
    Svg,
}

impl ImageKind {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png" | "jpg" | "jpeg" | "bmp") => Ok(ImageKind::Bitmap),
            Some("svg") => Ok(ImageKind::Svg),
            _ => Err(AppError::InvalidConfig(format!(
                "unsupported image file '{}' (use .png, .jpg, .bmp or .svg)",
                path.display()
            ))),
        }
    }
}

/// Configuration of a `darab load` run.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub input_path: PathBuf,
    pub labels: Vec<String>,
    /// Render every channel against time into this image.
    pub preview_image: Option<PathBuf>,
    /// Rows shown at each end of the terminal preview table.
    pub preview_rows: usize,
    pub dpi: u32,
}

impl LoadConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        ensure_path("input path", &self.input_path)?;
        if let Some(path) = &self.preview_image {
            ensure_path("preview image path", path)?;
            ImageKind::from_path(path)?;
        }
        if self.dpi == 0 {
            return Err(AppError::InvalidConfig("dpi must be positive".to_string()));
        }
        Ok(())
    }
}

/// A full fit run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults) and validated once with
/// [`FitConfig::validate`] before any file is touched.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Only samples strictly above this RPM are fitted.
    pub rpm_lower_bound: f64,
    pub input_path: PathBuf,
    /// Failure log overlaid on the chart (never fitted).
    pub secondary_input_path: Option<PathBuf>,
    pub plot_secondary: bool,
    /// Percentage (0–100) of the fitted curve drawn as the cutoff line.
    pub cutoff_percent: f64,
    pub plot_cutoff: bool,
    pub output_image_path: PathBuf,
    pub output_report_path: PathBuf,

    pub labels: Vec<String>,
    pub rpm_column: String,
    pub oilp_column: String,
    /// Signal referenced by the native expression (`{M400_rpm}`).
    pub signal_name: String,
    /// Name of the generated C++ function.
    pub function_name: String,
    pub dpi: u32,
    /// RPM spacing of the plotted fitted curve.
    pub curve_step: f64,
    pub export_curve: Option<PathBuf>,
}

impl FitConfig {
    /// Boundary validation of everything that does not depend on the data.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.rpm_lower_bound.is_finite() {
            return Err(AppError::InvalidConfig(format!(
                "rpm lower bound must be finite, got {}",
                self.rpm_lower_bound
            )));
        }
        ensure_path("input path", &self.input_path)?;
        ensure_path("output image path", &self.output_image_path)?;
        ImageKind::from_path(&self.output_image_path)?;
        ensure_path("output report path", &self.output_report_path)?;
        if self.output_image_path == self.output_report_path {
            return Err(AppError::InvalidConfig(
                "chart and report must be written to different files".to_string(),
            ));
        }
        if let Some(path) = &self.export_curve {
            ensure_path("curve export path", path)?;
        }
        if self.plot_secondary {
            match &self.secondary_input_path {
                Some(path) => ensure_path("secondary input path", path)?,
                None => {
                    return Err(AppError::InvalidConfig(
                        "plotting the secondary log requires a secondary input path".to_string(),
                    ));
                }
            }
        }
        if !(0.0..=100.0).contains(&self.cutoff_percent) {
            return Err(AppError::InvalidConfig(format!(
                "cutoff percent must be within [0, 100], got {}",
                self.cutoff_percent
            )));
        }
        if self.dpi == 0 {
            return Err(AppError::InvalidConfig("dpi must be positive".to_string()));
        }
        if !(self.curve_step.is_finite() && self.curve_step > 0.0) {
            return Err(AppError::InvalidConfig(format!(
                "curve step must be a positive number, got {}",
                self.curve_step
            )));
        }
        if self.rpm_column == self.oilp_column {
            return Err(AppError::InvalidConfig(
                "rpm and oil-pressure columns must differ".to_string(),
            ));
        }
        for column in [&self.rpm_column, &self.oilp_column] {
            if !self.labels.iter().any(|l| l == column) {
                return Err(AppError::InvalidConfig(format!(
                    "column `{column}` is not among the labels ({})",
                    self.labels.join(", ")
                )));
            }
        }
        if !crate::report::is_signal_name(&self.signal_name) {
            return Err(AppError::InvalidConfig(format!(
                "signal name `{}` must be non-empty without braces or whitespace",
                self.signal_name
            )));
        }
        if !crate::report::is_cpp_identifier(&self.function_name) {
            return Err(AppError::InvalidConfig(format!(
                "function name `{}` is not a C++ identifier",
                self.function_name
            )));
        }
        Ok(())
    }

    /// The bound must leave at least one observed sample above it.
    pub fn ensure_bound_in_range(&self, samples: &OilSamples) -> Result<(), AppError> {
        let (Some(min), Some(max)) = (samples.rpm_min(), samples.rpm_max()) else {
            return Err(AppError::data_format(&self.input_path, "log contains no samples"));
        };
        if self.rpm_lower_bound < min || self.rpm_lower_bound >= max {
            return Err(AppError::InvalidConfig(format!(
                "rpm lower bound {} is outside the observed RPM range [{min}, {max})",
                self.rpm_lower_bound
            )));
        }
        Ok(())
    }
}

fn ensure_path(what: &str, path: &Path) -> Result<(), AppError> {
    if path.as_os_str().is_empty() {
        return Err(AppError::InvalidConfig(format!("{what} must not be empty")));
    }
    Ok(())
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub source: PathBuf,
    pub rpm_lower_bound: f64,
    pub params: FitParams,
    pub fit_quality: FitQuality,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub rpm: Vec<f64>,
    pub oilp: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> FitConfig {
        FitConfig {
            rpm_lower_bound: 2500.0,
            input_path: PathBuf::from("good.txt"),
            secondary_input_path: None,
            plot_secondary: false,
            cutoff_percent: 70.0,
            plot_cutoff: true,
            output_image_path: PathBuf::from("out.png"),
            output_report_path: PathBuf::from("out.cpp"),
            labels: DEFAULT_FIT_LABELS.iter().map(|s| s.to_string()).collect(),
            rpm_column: "RPM".to_string(),
            oilp_column: "Oil Pressure".to_string(),
            signal_name: "M400_rpm".to_string(),
            function_name: "oil_pressure_prediction".to_string(),
            dpi: 600,
            curve_step: 1.0,
            export_curve: None,
        }
    }

    #[test]
    fn default_config_is_valid() {
        sample_config().validate().unwrap();
    }

    #[test]
    fn cutoff_percent_outside_range_is_rejected() {
        for bad in [-1.0, 100.5, f64::NAN] {
            let mut config = sample_config();
            config.cutoff_percent = bad;
            assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
        }
    }

    #[test]
    fn plotting_secondary_requires_a_path() {
        let mut config = sample_config();
        config.plot_secondary = true;
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));

        config.secondary_input_path = Some(PathBuf::from("bad.txt"));
        config.validate().unwrap();
    }

    #[test]
    fn image_kind_follows_extension() {
        assert_eq!(ImageKind::from_path(Path::new("a.PNG")).unwrap(), ImageKind::Bitmap);
        assert_eq!(ImageKind::from_path(Path::new("a.svg")).unwrap(), ImageKind::Svg);
        assert!(ImageKind::from_path(Path::new("a.pdf")).is_err());
        assert!(ImageKind::from_path(Path::new("chart")).is_err());
    }

    #[test]
    fn empty_paths_are_rejected() {
        let mut config = sample_config();
        config.output_report_path = PathBuf::new();
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn chart_and_report_need_distinct_paths() {
        let mut config = sample_config();
        config.output_report_path = config.output_image_path.clone();
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn load_config_checks_preview_format() {
        let mut config = LoadConfig {
            input_path: PathBuf::from("log.txt"),
            labels: DEFAULT_LOG_LABELS.iter().map(|s| s.to_string()).collect(),
            preview_image: None,
            preview_rows: 5,
            dpi: 600,
        };
        config.validate().unwrap();

        config.preview_image = Some(PathBuf::from("preview.gif"));
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));

        config.preview_image = Some(PathBuf::from("preview.svg"));
        config.dpi = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn function_name_must_be_an_identifier() {
        let mut config = sample_config();
        config.function_name = "oil-pressure prediction".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn signal_name_cannot_break_the_expression() {
        for bad in ["M400 rpm", "{M400_rpm}", "rpm}", ""] {
            let mut config = sample_config();
            config.signal_name = bad.to_string();
            assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))), "{bad:?}");
        }
    }

    #[test]
    fn columns_must_be_labelled() {
        let mut config = sample_config();
        config.rpm_column = "Engine Speed".to_string();
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn bound_must_leave_samples_above_it() {
        let samples = OilSamples {
            rpm: vec![2000.0, 3000.0, 4000.0],
            oilp: vec![40.0, 55.0, 62.0],
        };
        let mut config = sample_config();
        config.ensure_bound_in_range(&samples).unwrap();

        config.rpm_lower_bound = 4000.0;
        assert!(matches!(
            config.ensure_bound_in_range(&samples),
            Err(AppError::InvalidConfig(_))
        ));

        config.rpm_lower_bound = 1000.0;
        assert!(config.ensure_bound_in_range(&samples).is_err());
    }

    #[test]
    fn above_is_strict() {
        let samples = OilSamples {
            rpm: vec![2500.0, 2500.1, 2499.9, 3000.0],
            oilp: vec![1.0, 2.0, 3.0, 4.0],
        };
        let kept = samples.above(2500.0);
        assert_eq!(kept.rpm, vec![2500.1, 3000.0]);
        assert_eq!(kept.oilp, vec![2.0, 4.0]);
    }

    #[test]
    fn channel_lookup_is_by_name() {
        let table = LogTable {
            time_label: "Time".to_string(),
            time: vec![0.0, 0.1],
            channels: vec![
                Channel {
                    label: "Oil Pressure".to_string(),
                    values: vec![40.0, 41.0],
                },
                Channel {
                    label: "RPM".to_string(),
                    values: vec![3000.0, 3100.0],
                },
            ],
        };
        let samples = OilSamples::from_table(&table, "RPM", "Oil Pressure", Path::new("x")).unwrap();
        assert_eq!(samples.rpm, vec![3000.0, 3100.0]);
        assert_eq!(samples.oilp, vec![40.0, 41.0]);

        let err = table.require_channel("Boost", Path::new("x")).unwrap_err();
        assert!(err.to_string().contains("Boost"));
    }
}
