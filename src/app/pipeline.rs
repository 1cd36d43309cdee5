//! The two pipelines behind `darab load` and `darab fit`.
//!
//! Both compute everything first and write outputs last: images, report and
//! curve JSON are produced into staging files and only moved into place once
//! the whole run has succeeded.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, info};

use crate::domain::{FitConfig, FitParams, FitResult, ImageKind, LoadConfig, LogTable, OilSamples};
use crate::error::AppError;
use crate::fit::{FitOptions, curve_points, fit_log_model};
use crate::io::curve::{build_curve_file, write_curve_json};
use crate::io::export::{StagedFile, commit_all};
use crate::io::load_log;
use crate::plot::{Chart, FitChart, PreviewChart, render_chart};
use crate::report::{ReportNames, parse_cpp_function, parse_native_expression, render_report};

/// Output of a `darab load` run.
#[derive(Debug, Clone)]
pub struct LoadRun {
    pub table: LogTable,
    pub preview_written: Option<PathBuf>,
}

/// Everything a `darab fit` run computed and wrote.
#[derive(Debug, Clone)]
pub struct FitRun {
    /// Unfiltered primary samples.
    pub all: OilSamples,
    /// Samples above the RPM bound (the fit input).
    pub fitted: OilSamples,
    pub secondary: Option<OilSamples>,
    pub fit: FitResult,
    /// Dense fitted curve as plotted.
    pub curve: Vec<(f64, f64)>,
    pub report: String,
    pub written: Vec<PathBuf>,
}

/// Load a log and optionally chart every channel against time.
pub fn run_load(config: &LoadConfig) -> Result<LoadRun, AppError> {
    config.validate()?;
    let table = load_log(&config.input_path, &config.labels)?;

    let preview_written = match &config.preview_image {
        Some(path) => {
            let staged = render_staged(&PreviewChart::new(&table), path, config.dpi)?;
            commit_all(vec![staged])?.into_iter().next()
        }
        None => None,
    };

    Ok(LoadRun { table, preview_written })
}

/// Execute the fit pipeline, stamping the report with the local time.
pub fn run_fit(config: &FitConfig) -> Result<FitRun, AppError> {
    run_fit_at(config, chrono::Local::now().naive_local())
}

/// Execute the fit pipeline with a fixed report timestamp.
pub fn run_fit_at(config: &FitConfig, generated: NaiveDateTime) -> Result<FitRun, AppError> {
    config.validate()?;
    crate::logging::log_fit_config(config);

    // 1) Primary log, channels by name.
    let table = load_log(&config.input_path, &config.labels)?;
    let all = OilSamples::from_table(&table, &config.rpm_column, &config.oilp_column, &config.input_path)?;
    config.ensure_bound_in_range(&all)?;

    // 2) Failure log for the overlay. Loaded before any fitting so a missing
    //    file fails fast.
    let secondary = match (&config.secondary_input_path, config.plot_secondary) {
        (Some(path), true) => {
            let table = load_log(path, &config.labels)?;
            Some(OilSamples::from_table(&table, &config.rpm_column, &config.oilp_column, path)?)
        }
        _ => None,
    };

    // 3) Filter and fit.
    let fitted = all.above(config.rpm_lower_bound);
    crate::logging::log_filter(&all, &fitted, config.rpm_lower_bound);
    let fit = fit_log_model(&fitted, &FitOptions::default())?;
    crate::logging::log_fit_result(&fit);

    // 4) Dense curve from the bound up to the largest fitted RPM.
    let rpm_max = fitted
        .rpm_max()
        .ok_or_else(|| AppError::FitConvergence("no samples above the RPM bound".to_string()))?;
    let curve = curve_points(&fit.params, config.rpm_lower_bound, rpm_max, config.curve_step);
    debug!("Curve: {} point(s) over [{}, {rpm_max})", curve.len(), config.rpm_lower_bound);

    // 5) Report text, checked against the fitted parameters.
    let names = ReportNames::from_config(config);
    let report = render_report(&fit, &names, config.rpm_lower_bound, generated);
    check_report(&report, &fit.params, &config.output_report_path)?;

    // 6) Stage every output, then commit them together.
    let chart = FitChart::new(
        &all,
        secondary.as_ref(),
        &fit.params,
        &curve,
        config.plot_cutoff.then_some(config.cutoff_percent),
    );
    let mut staged = vec![render_staged(&chart, &config.output_image_path, config.dpi)?];

    let mut report_file = StagedFile::new(&config.output_report_path)?;
    report_file.write_all(report.as_bytes())?;
    staged.push(report_file);

    if let Some(path) = &config.export_curve {
        let doc = build_curve_file(&fit, &config.input_path, config.rpm_lower_bound, rpm_max);
        let mut file = StagedFile::new(path)?;
        write_curve_json(&mut file, &doc)?;
        staged.push(file);
    }

    let written = commit_all(staged)?;
    info!("Wrote {} output file(s)", written.len());

    Ok(FitRun {
        all,
        fitted,
        secondary,
        fit,
        curve,
        report,
        written,
    })
}

fn render_staged<C: Chart>(chart: &C, target: &Path, dpi: u32) -> Result<StagedFile, AppError> {
    let kind = ImageKind::from_path(target)?;
    let staged = StagedFile::new(target)?;
    render_chart(chart, staged.path(), kind, dpi)?;
    Ok(staged)
}

/// Both renderings in the report must read back as the fitted parameters,
/// up to the three printed decimals.
fn check_report(report: &str, params: &FitParams, target: &Path) -> Result<(), AppError> {
    let (Some(native), Some(cpp)) = (parse_native_expression(report), parse_cpp_function(report)) else {
        return Err(AppError::data_format(
            target,
            "generated report has no readable WinDarab expression or C++ function",
        ));
    };
    for (what, parsed) in [("WinDarab expression", native.params), ("C++ function", cpp.params)] {
        if !matches_rounded(&parsed, params) {
            return Err(AppError::data_format(
                target,
                format!("generated {what} reads back as {parsed:?}, fitted {params:?}"),
            ));
        }
    }
    debug!("Report expressions verified: {:?}", native.params);
    Ok(())
}

/// Half a unit in the third decimal, plus slack for the magnitude of `x`.
fn matches_rounded(parsed: &FitParams, fitted: &FitParams) -> bool {
    let close = |p: f64, f: f64| (p - f).abs() <= 5e-4 + 1e-12 * f.abs().max(1.0);
    close(parsed.a, fitted.a) && close(parsed.b, fitted.b) && close(parsed.c, fitted.c)
}
