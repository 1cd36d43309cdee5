//! Text formatting: the generated-function report and terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use std::fmt::Write as _;

use chrono::NaiveDateTime;

use crate::domain::{FitConfig, FitParams, FitResult, LogTable, OilSamples};

/// Timestamp layout of the report header.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Names used when rendering the fitted function as code.
#[derive(Debug, Clone)]
pub struct ReportNames {
    /// Input signal of the native expression (without braces).
    pub signal: String,
    /// C++ function name.
    pub function: String,
}

impl ReportNames {
    pub fn from_config(config: &FitConfig) -> Self {
        Self {
            signal: config.signal_name.clone(),
            function: config.function_name.clone(),
        }
    }
}

/// The fitted function in the acquisition tool's expression syntax.
///
/// `20.000 * ln({M400_rpm} -1000.000) -90.000`
pub fn native_expression(params: &FitParams, signal: &str) -> String {
    format!(
        "{:.3} * ln({{{signal}}} {:+.3}) {:+.3}",
        params.a, params.b, params.c
    )
}

/// The fitted function as a C++ function taking a `StateSignal`.
pub fn cpp_function(params: &FitParams, function: &str) -> String {
    format!(
        "float {function}(StateSignal &rpm){{\n\treturn {:.3} * log(rpm.value() {:+.3}) {:+.3};\n}}\n",
        params.a, params.b, params.c
    )
}

/// Full report file contents.
pub fn render_report(
    fit: &FitResult,
    names: &ReportNames,
    rpm_lower_bound: f64,
    generated: NaiveDateTime,
) -> String {
    let mut out = String::new();
    out.push_str("// C++ function generator for rpm-based oil pressure prediction\n");
    out.push_str("//\n");
    let _ = writeln!(out, "// Function generated: {}", generated.format(TIMESTAMP_FORMAT));
    let _ = writeln!(
        out,
        "// Fitted on {} sample(s) above {rpm_lower_bound} rpm (RMSE {:.3} psi)",
        fit.quality.n, fit.quality.rmse
    );
    out.push('\n');

    out.push_str("// WinDarab function:\n");
    let _ = writeln!(out, "// {}", native_expression(&fit.params, &names.signal));
    out.push('\n');

    out.push_str("// C++ function:\n");
    out.push_str(&cpp_function(&fit.params, &names.function));
    out
}

/// Format the run summary printed after a fit.
pub fn format_run_summary(
    config: &FitConfig,
    all: &OilSamples,
    fitted: &OilSamples,
    secondary: Option<&OilSamples>,
    fit: &FitResult,
) -> String {
    let mut out = String::new();

    out.push_str("=== darab - Oil Pressure Curve Fit ===\n");
    let _ = writeln!(out, "Input: {}", config.input_path.display());
    if let (Some(path), Some(s)) = (&config.secondary_input_path, secondary) {
        let _ = writeln!(out, "Failure log: {} (n={}, plotted only)", path.display(), s.len());
    }
    let _ = writeln!(
        out,
        "Samples: n={} | fitted n={} (rpm > {})",
        all.len(),
        fitted.len(),
        config.rpm_lower_bound
    );
    if let (Some(lo), Some(hi)) = (fitted.rpm_min(), fitted.rpm_max()) {
        let _ = writeln!(out, "Fitted RPM: [{lo:.0}, {hi:.0}]");
    }

    out.push_str("\nModel: oilp = a * ln(rpm + b) + c\n");
    let _ = writeln!(out, "- a = {:.6}", fit.params.a);
    let _ = writeln!(out, "- b = {:.6}", fit.params.b);
    let _ = writeln!(out, "- c = {:.6}", fit.params.c);
    let _ = writeln!(
        out,
        "SSE={:.4} RMSE={:.4}psi (LM iterations: {})",
        fit.quality.sse, fit.quality.rmse, fit.quality.iterations
    );
    let _ = writeln!(out, "WinDarab: {}", native_expression(&fit.params, &config.signal_name));

    out
}

/// Head/tail table view of a loaded log, `rows` lines from each end.
pub fn format_table_preview(table: &LogTable, rows: usize) -> String {
    let mut headers = vec![table.time_label.as_str()];
    headers.extend(table.labels());
    let widths: Vec<usize> = headers.iter().map(|h| h.len().max(10)).collect();

    let mut out = String::new();
    for (h, &w) in headers.iter().zip(&widths) {
        let _ = write!(out, "{h:>w$}  ");
    }
    out.truncate(out.trim_end().len());
    out.push('\n');

    let n = table.len();
    let write_row = |out: &mut String, i: usize| {
        let _ = write!(out, "{:>w$.3}  ", table.time[i], w = widths[0]);
        for (c, &w) in table.channels.iter().zip(&widths[1..]) {
            let _ = write!(out, "{:>w$.3}  ", c.values[i]);
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    };

    if n <= rows * 2 {
        for i in 0..n {
            write_row(&mut out, i);
        }
    } else {
        for i in 0..rows {
            write_row(&mut out, i);
        }
        out.push_str("...\n");
        for i in n - rows..n {
            write_row(&mut out, i);
        }
    }

    let _ = writeln!(out, "\n[{n} rows x {} columns]", table.channels.len());
    out
}
