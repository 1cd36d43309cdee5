//! Command-line parsing for the WinDarab log tools.
//!
//! Argument parsing lives here; `app` turns the parsed arguments into the
//! domain configs the pipelines run on.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_FIT_LABELS, DEFAULT_LOG_LABELS};
use crate::plot::DEFAULT_DPI;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "darab", version, about = "WinDarab log loader and oil-pressure curve fitter")]
pub struct Cli {
    /// Debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// No logging at all (errors are still printed).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a log, print a head/tail preview and optionally chart every channel.
    Load(LoadArgs),
    /// Fit oil pressure against RPM and write the chart and function report.
    Fit(FitArgs),
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// WinDarab text export.
    #[arg(value_name = "LOG", env = "DARAB_INPUT")]
    pub input: PathBuf,

    /// Column labels in file order; the first one is the time axis.
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_LOG_LABELS.map(String::from),
        env = "DARAB_LABELS"
    )]
    pub labels: Vec<String>,

    /// Chart every channel against time into this image (.png, .jpg, .bmp or .svg).
    #[arg(long, value_name = "IMAGE")]
    pub preview: Option<PathBuf>,

    /// Rows printed from each end of the table.
    #[arg(long, default_value_t = 5)]
    pub rows: usize,

    /// Resolution of the preview image.
    #[arg(long, default_value_t = DEFAULT_DPI, env = "DARAB_DPI")]
    pub dpi: u32,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Log with the healthy-engine data that is fitted.
    #[arg(value_name = "LOG", env = "DARAB_INPUT")]
    pub input: PathBuf,

    /// Only samples with RPM strictly above this bound are fitted.
    #[arg(
        short = 'b',
        long,
        default_value_t = 2500.0,
        allow_negative_numbers = true,
        env = "DARAB_RPM_LOWER_BOUND"
    )]
    pub rpm_lower_bound: f64,

    /// Failure log overlaid on the chart in red (never fitted).
    #[arg(long, value_name = "LOG", env = "DARAB_SECONDARY")]
    pub secondary: Option<PathBuf>,

    /// Ignore `--secondary` (and `DARAB_SECONDARY`) for this run.
    #[arg(long)]
    pub no_secondary_plot: bool,

    /// Cutoff line drawn at this percentage of the fitted curve.
    #[arg(long, default_value_t = 70.0, env = "DARAB_CUTOFF_PERCENT")]
    pub cutoff_percent: f64,

    /// Do not draw the cutoff line.
    #[arg(long)]
    pub no_cutoff: bool,

    /// Chart output (.png, .jpg, .bmp or .svg).
    #[arg(short = 'o', long, default_value = "lower_cutoff.png", env = "DARAB_OUTPUT_IMAGE")]
    pub output_image: PathBuf,

    /// Report output with the WinDarab expression and the C++ function.
    #[arg(short = 'r', long, default_value = "oilp_prediction.cpp", env = "DARAB_OUTPUT_REPORT")]
    pub output_report: PathBuf,

    /// Column labels in file order; the first one is the time axis.
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_FIT_LABELS.map(String::from),
        env = "DARAB_LABELS"
    )]
    pub labels: Vec<String>,

    /// Label of the RPM column.
    #[arg(long, default_value = "RPM")]
    pub rpm_column: String,

    /// Label of the oil-pressure column.
    #[arg(long, default_value = "Oil Pressure")]
    pub oilp_column: String,

    /// Signal referenced by the WinDarab expression.
    #[arg(long, default_value = "M400_rpm", env = "DARAB_SIGNAL")]
    pub signal: String,

    /// Name of the generated C++ function.
    #[arg(long, default_value = "oil_pressure_prediction", env = "DARAB_FUNCTION")]
    pub function: String,

    /// Chart resolution.
    #[arg(long, default_value_t = DEFAULT_DPI, env = "DARAB_DPI")]
    pub dpi: u32,

    /// RPM spacing of the plotted curve.
    #[arg(long, default_value_t = 1.0)]
    pub curve_step: f64,

    /// Also export the curve (params, fit quality, fitted grid) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,
}
