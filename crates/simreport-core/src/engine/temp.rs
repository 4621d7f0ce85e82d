use super::config::ReportConfig;
use super::error::EngineError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Directory receiving the plots of one build.
///
/// Every file in the area is deleted by [`TempArea::sweep`]. An area that is
/// dropped without being swept sweeps itself, so an aborted build leaves no
/// generated images behind.
#[derive(Debug)]
pub struct TempArea {
    path: PathBuf,
    isolated: Option<TempDir>,
    swept: bool,
}

impl TempArea {
    pub fn prepare(config: &ReportConfig) -> Result<Self, EngineError> {
        let io_error = |path: &Path, source| EngineError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        };
        fs::create_dir_all(&config.temp_dir).map_err(|e| io_error(&config.temp_dir, e))?;

        if config.isolate_temp {
            let dir = tempfile::Builder::new()
                .prefix("build-")
                .tempdir_in(&config.temp_dir)
                .map_err(|e| io_error(&config.temp_dir, e))?;
            debug!("Using isolated temp area {:?}", dir.path());
            Ok(Self {
                path: dir.path().to_path_buf(),
                isolated: Some(dir),
                swept: false,
            })
        } else {
            Ok(Self {
                path: config.temp_dir.clone(),
                isolated: None,
                swept: false,
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes every file in the area and returns how many were removed.
    /// Failures are logged and never escalate.
    pub fn sweep(&mut self) -> usize {
        self.swept = true;
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not list temp area {:?} for cleanup: {}", self.path, e);
                return 0;
            }
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Could not delete temporary file {:?}: {}", path, e),
            }
        }
        debug!("Swept {} file(s) from {:?}", removed, self.path);
        removed
    }
}

impl Drop for TempArea {
    fn drop(&mut self) {
        if !self.swept {
            self.sweep();
        }
        if let Some(dir) = self.isolated.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!("Could not remove isolated temp area {:?}: {}", path, e);
            }
        }
    }
}
