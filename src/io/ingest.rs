//! Text-export ingest.
//!
//! This module is responsible for turning a WinDarab "export text" file into a
//! labelled, time-indexed [`LogTable`].
//!
//! Layout of the file:
//! - [`HEADER_LINES`] header lines (ignored)
//! - one row per sample, whitespace-delimited floats, first column is time
//!
//! Design goals:
//! - **Strict schema**: the column count of every row must equal the number of
//!   labels; nothing is ever labelled positionally by accident
//! - **Fail fast**: any bad row aborts the load with the offending line number
//! - **Separation of concerns**: no plotting or fitting logic here

use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};

use crate::domain::{Channel, HEADER_LINES, LogTable};
use crate::error::AppError;

/// Load and label a log file.
///
/// `labels[0]` names the time axis; the remaining labels name the channels in
/// file order.
pub fn load_log<S: AsRef<str>>(path: &Path, labels: &[S]) -> Result<LogTable, AppError> {
    check_labels(labels)?;

    let bytes = std::fs::read(path).map_err(|e| AppError::from_open(path, e))?;
    // Header lines may carry units in a legacy code page (e.g. `°C`); data rows are ASCII.
    let text = String::from_utf8_lossy(&bytes);

    let table = parse_log(&text, labels, path)?;
    info!(
        "Loaded '{}': {} sample(s), channels [{}]",
        path.display(),
        table.len(),
        table.labels().collect::<Vec<_>>().join(", ")
    );
    Ok(table)
}

/// Parse the text of an export. `source` is only used in error messages.
pub fn parse_log<S: AsRef<str>>(text: &str, labels: &[S], source: &Path) -> Result<LogTable, AppError> {
    check_labels(labels)?;
    let width = labels.len();

    let mut lines = text.lines().enumerate();
    let header_seen = lines.by_ref().take(HEADER_LINES).count();
    if header_seen < HEADER_LINES {
        return Err(AppError::data_format(
            source,
            format!("file has {header_seen} line(s); expected {HEADER_LINES} header lines followed by data"),
        ));
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); width];
    for (idx, raw) in lines {
        // 1-based line numbers.
        let line = idx + 1;
        let content = strip_comment(raw).trim();
        if content.is_empty() {
            continue;
        }

        let row = parse_row(content, width)
            .map_err(|message| AppError::data_format(source, format!("line {line}: {message}")))?;

        if let (Some(prev), Some(&time)) = (columns[0].last(), row.first()) {
            if time < *prev {
                return Err(AppError::data_format(
                    source,
                    format!("line {line}: time {time} is earlier than the previous sample ({prev})"),
                ));
            }
        }

        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }

    if columns[0].is_empty() {
        return Err(AppError::data_format(
            source,
            format!("no data rows after the {HEADER_LINES}-line header"),
        ));
    }
    debug!("Parsed {} row(s) x {width} column(s) from '{}'", columns[0].len(), source.display());

    let mut columns = columns.into_iter();
    let time = columns.next().unwrap_or_default();
    let channels = labels[1..]
        .iter()
        .zip(columns)
        .map(|(label, values)| Channel {
            label: label.as_ref().to_string(),
            values,
        })
        .collect();

    Ok(LogTable {
        time_label: labels[0].as_ref().to_string(),
        time,
        channels,
    })
}

fn check_labels<S: AsRef<str>>(labels: &[S]) -> Result<(), AppError> {
    if labels.len() < 2 {
        return Err(AppError::InvalidConfig(format!(
            "need a time label plus at least one channel label, got {}",
            labels.len()
        )));
    }
    let mut seen = HashSet::new();
    for label in labels {
        let label = label.as_ref().trim();
        if label.is_empty() {
            return Err(AppError::InvalidConfig("column labels must not be empty".to_string()));
        }
        if !seen.insert(label) {
            return Err(AppError::InvalidConfig(format!("duplicate column label `{label}`")));
        }
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_row(content: &str, width: usize) -> Result<Vec<f64>, String> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    if tokens.len() != width {
        return Err(format!(
            "expected {width} column(s) (one per label), found {}",
            tokens.len()
        ));
    }

    tokens
        .iter()
        .enumerate()
        .map(|(col, tok)| match tok.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(format!("column {}: `{tok}` is not a finite number", col + 1)),
            Err(_) => Err(format!("column {}: `{tok}` is not a number", col + 1)),
        })
        .collect()
}
