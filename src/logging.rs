//! Logger setup and run-level log lines.

use log::{debug, info};

use crate::domain::{FitConfig, FitResult, OilSamples};

/// Initialize `env_logger`.
///
/// `-q` silences everything, `-v` enables debug output. Without either flag
/// `RUST_LOG` decides, falling back to warnings only.
pub fn init_logger(verbose: bool, quiet: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if quiet {
        builder.filter_level(log::LevelFilter::Off);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    // A second init (tests driving `app::run` twice) is harmless.
    let _ = builder.try_init();
    debug!("Logger initialized (verbose={verbose}, quiet={quiet})");
}

/// Log the effective fit configuration.
pub fn log_fit_config(config: &FitConfig) {
    info!(
        "Fit: input='{}', rpm > {}, columns rpm=`{}` oilp=`{}`",
        config.input_path.display(),
        config.rpm_lower_bound,
        config.rpm_column,
        config.oilp_column
    );
    if config.plot_secondary {
        if let Some(path) = &config.secondary_input_path {
            info!("Failure log overlay: '{}'", path.display());
        }
    }
    if config.plot_cutoff {
        info!("Cutoff line at {}% of the fitted curve", config.cutoff_percent);
    }
    debug!(
        "Outputs: image='{}' report='{}' curve={:?} dpi={}",
        config.output_image_path.display(),
        config.output_report_path.display(),
        config.export_curve,
        config.dpi
    );
}

/// Log how many samples survived the RPM filter.
pub fn log_filter(all: &OilSamples, fitted: &OilSamples, rpm_lower_bound: f64) {
    info!(
        "Kept {} of {} sample(s) with rpm > {rpm_lower_bound}",
        fitted.len(),
        all.len()
    );
}

pub fn log_fit_result(fit: &FitResult) {
    info!(
        "Fitted a={:.6} b={:.6} c={:.6} (rmse {:.4}, {} LM iteration(s))",
        fit.params.a, fit.params.b, fit.params.c, fit.quality.rmse, fit.quality.iterations
    );
}
