//! All-or-nothing output files.
//!
//! Outputs are first written to hidden temporary files next to their final
//! destination and only renamed into place by [`commit_all`] once every output
//! of the run has been produced. Dropping an uncommitted [`StagedFile`] deletes
//! it, so a failed run leaves no partial output behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::AppError;

/// A temporary file that becomes `target` on commit.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Create the staging file in `target`'s directory, keeping its extension
    /// (image backends pick the encoder from it).
    pub fn new(target: &Path) -> Result<Self, AppError> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let suffix = target
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix(".darab-").suffix(&suffix);
        // Same mode as `File::create` (before umask); temp files default to 0600.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let temp = builder.tempfile_in(dir).map_err(|e| AppError::io(target, e))?;

        Ok(Self {
            temp,
            target: target.to_path_buf(),
        })
    }

    /// Path of the staging file (write here, not to `target`).
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), AppError> {
        self.temp
            .write_all(bytes)
            .and_then(|_| self.temp.flush())
            .map_err(|e| AppError::io(&self.target, e))
    }

    pub fn as_file_mut(&mut self) -> &mut std::fs::File {
        self.temp.as_file_mut()
    }

    fn commit(self) -> Result<PathBuf, AppError> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| AppError::io(&target, e.error))?;
        Ok(target)
    }
}

/// Move every staged file into place, returning the final paths.
///
/// If one rename fails, outputs already moved into place by this call are
/// removed again (a target that existed before the run is not restored) and
/// the remaining staged files are discarded.
pub fn commit_all(files: Vec<StagedFile>) -> Result<Vec<PathBuf>, AppError> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        match file.commit() {
            Ok(path) => {
                debug!("Wrote '{}'", path.display());
                written.push(path);
            }
            Err(err) => {
                for path in &written {
                    if let Err(e) = std::fs::remove_file(path) {
                        warn!("Could not remove '{}' after a failed commit: {e}", path.display());
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(written)
}
