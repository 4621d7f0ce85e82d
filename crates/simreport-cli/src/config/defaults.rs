use directories::ProjectDirs;
use simreport::core::io::pdf::style::PageFormat;
use simreport::core::plot::PlotImageFormat;
use simreport::engine::config::{DEFAULT_COLUMNS, DEFAULT_PLOT_TIMEOUT};
use std::path::PathBuf;

/// Overrides the default temp directory when set to a non-empty value.
pub const TEMP_DIR_ENV: &str = "SIMREPORT_TEMP_DIR";

pub struct DefaultsConfig {
    pub columns: usize,
    pub plot_timeout_secs: u64,
    pub image_format: PlotImageFormat,
    pub page: PageFormat,
    pub isolate_temp: bool,
    pub verbose_console: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            plot_timeout_secs: DEFAULT_PLOT_TIMEOUT.as_secs(),
            image_format: PlotImageFormat::Png,
            page: PageFormat::A4,
            isolate_temp: false,
            verbose_console: false,
        }
    }
}

/// `$SIMREPORT_TEMP_DIR`, else the per-user cache directory, else the OS temp dir.
pub fn default_temp_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(TEMP_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("edu", "caltech", "simreport")
        .map(|dirs| dirs.cache_dir().join("plots"))
        .unwrap_or_else(|| std::env::temp_dir().join("simreport"))
}
