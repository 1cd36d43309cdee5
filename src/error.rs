//! Error taxonomy for both pipelines.
//!
//! Every failure is fatal to a run. Each variant carries the process exit code
//! that `main` reports, so callers only ever propagate with `?`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// An input log does not exist.
    #[error("File not found: '{}'", path.display())]
    FileNotFound { path: PathBuf },

    /// The run configuration failed validation at the boundary.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input log could not be parsed into the expected table shape.
    #[error("Data format error in '{}': {message}", path.display())]
    DataFormat { path: PathBuf, message: String },

    /// The optimizer diverged, ran out of iterations or left the model's domain.
    #[error("Fit did not converge: {0}")]
    FitConvergence(String),

    /// The chart backend failed to draw or encode an image.
    #[error("Failed to render chart '{}': {message}", path.display())]
    Render { path: PathBuf, message: String },

    /// Any other filesystem failure.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn data_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DataFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map an `open()` failure, keeping "not found" distinct from other I/O errors.
    pub fn from_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Io { .. } => 1,
            AppError::FileNotFound { .. } | AppError::InvalidConfig(_) => 2,
            AppError::DataFormat { .. } => 3,
            AppError::FitConvergence(_) => 4,
            AppError::Render { .. } => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_not_found_maps_to_file_not_found() {
        let err = AppError::from_open(
            "missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, AppError::FileNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn other_open_errors_stay_io() {
        let err = AppError::from_open(
            "locked.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, AppError::Io { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn messages_name_the_path() {
        let err = AppError::data_format("log.txt", "line 7: expected 3 columns, found 2");
        assert_eq!(
            err.to_string(),
            "Data format error in 'log.txt': line 7: expected 3 columns, found 2"
        );
        assert_eq!(err.exit_code(), 3);
    }
}
