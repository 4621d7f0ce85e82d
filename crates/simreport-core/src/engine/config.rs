use crate::core::io::pdf::style::{PageFormat, Theme};
use crate::core::plot::PlotImageFormat;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_COLUMNS: usize = 2;
pub const DEFAULT_PLOT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Directory receiving generated plots; swept after every build.
    pub temp_dir: PathBuf,
    /// Use a fresh subdirectory of `temp_dir` for each build.
    pub isolate_temp: bool,
    pub columns: usize,
    /// Upper bound on a single plot rendering; `None` waits indefinitely.
    pub plot_timeout: Option<Duration>,
    pub plot_format: PlotImageFormat,
    /// Emit human-readable progress messages.
    pub verbose: bool,
    pub page: PageFormat,
    pub theme: Theme,
}

#[derive(Default)]
pub struct ReportConfigBuilder {
    temp_dir: Option<PathBuf>,
    isolate_temp: Option<bool>,
    columns: Option<usize>,
    plot_timeout: Option<Option<Duration>>,
    plot_format: Option<PlotImageFormat>,
    verbose: Option<bool>,
    page: Option<PageFormat>,
    theme: Option<Theme>,
}

impl ReportConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temp_dir(mut self, path: PathBuf) -> Self {
        self.temp_dir = Some(path);
        self
    }
    pub fn isolate_temp(mut self, isolate: bool) -> Self {
        self.isolate_temp = Some(isolate);
        self
    }
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }
    pub fn plot_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.plot_timeout = Some(timeout);
        self
    }
    pub fn plot_format(mut self, format: PlotImageFormat) -> Self {
        self.plot_format = Some(format);
        self
    }
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
    pub fn page(mut self, page: PageFormat) -> Self {
        self.page = Some(page);
        self
    }
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn build(self) -> Result<ReportConfig, ConfigError> {
        let columns = self.columns.unwrap_or(DEFAULT_COLUMNS);
        if columns == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "columns",
                reason: "must be at least 1".to_string(),
            });
        }
        let plot_timeout = self.plot_timeout.unwrap_or(Some(DEFAULT_PLOT_TIMEOUT));
        if plot_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidParameter {
                name: "plot_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(ReportConfig {
            temp_dir: self
                .temp_dir
                .ok_or(ConfigError::MissingParameter("temp_dir"))?,
            isolate_temp: self.isolate_temp.unwrap_or(false),
            columns,
            plot_timeout,
            plot_format: self.plot_format.unwrap_or_default(),
            verbose: self.verbose.unwrap_or(false),
            page: self.page.unwrap_or_default(),
            theme: self.theme.unwrap_or_default(),
        })
    }
}
