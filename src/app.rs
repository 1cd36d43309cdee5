//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - turns arguments into validated pipeline configs
//! - prints terminal output for the finished run

use std::path::Path;

use clap::Parser;
use log::debug;

use crate::cli::{Cli, Command, FitArgs, LoadArgs};
use crate::domain::{FitConfig, LoadConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `darab` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    crate::logging::init_logger(cli.verbose, cli.quiet);
    if let Ok(path) = dotenv {
        debug!("Loaded environment from '{}'", path.display());
    }

    match cli.command {
        Command::Load(args) => handle_load(&args),
        Command::Fit(args) => handle_fit(&args),
    }
}

fn handle_load(args: &LoadArgs) -> Result<(), AppError> {
    let config = load_config_from_args(args);
    let run = pipeline::run_load(&config)?;

    println!("{}", crate::report::format_table_preview(&run.table, config.preview_rows));
    if let Some(path) = &run.preview_written {
        print_written(path);
    }
    Ok(())
}

fn handle_fit(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&config, &run.all, &run.fitted, run.secondary.as_ref(), &run.fit)
    );
    for path in &run.written {
        print_written(path);
    }
    Ok(())
}

fn print_written(path: &Path) {
    println!("Wrote {}", path.display());
}

pub fn load_config_from_args(args: &LoadArgs) -> LoadConfig {
    LoadConfig {
        input_path: args.input.clone(),
        labels: args.labels.clone(),
        preview_image: args.preview.clone(),
        preview_rows: args.rows,
        dpi: args.dpi,
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        rpm_lower_bound: args.rpm_lower_bound,
        input_path: args.input.clone(),
        secondary_input_path: args.secondary.clone(),
        plot_secondary: args.secondary.is_some() && !args.no_secondary_plot,
        cutoff_percent: args.cutoff_percent,
        plot_cutoff: !args.no_cutoff,
        output_image_path: args.output_image.clone(),
        output_report_path: args.output_report.clone(),

        labels: args.labels.clone(),
        rpm_column: args.rpm_column.clone(),
        oilp_column: args.oilp_column.clone(),
        signal_name: args.signal.clone(),
        function_name: args.function.clone(),
        dpi: args.dpi,
        curve_step: args.curve_step,
        export_curve: args.export_curve.clone(),
    }
}
