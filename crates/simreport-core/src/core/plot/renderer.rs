use crate::core::catalog::codes::{DATA_LABELS, DATA_UNITS};
use crate::core::models::metadata::AttributeValueSet;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotImageFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl PlotImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }
}

impl FromStr for PlotImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            other => Err(format!(
                "unsupported plot image format '{other}' (expected png, jpeg or bmp)"
            )),
        }
    }
}

impl fmt::Display for PlotImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Axis labels and units of a tabular file, one entry per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisMetadata {
    pub labels: Vec<String>,
    pub units: Vec<String>,
}

impl AxisMetadata {
    /// Reads the comma-separated `DATA_LABELS` and `DATA_UNITS` attributes.
    pub fn from_metadata(metadata: &AttributeValueSet) -> Self {
        let split = |code: &str| -> Vec<String> {
            metadata
                .first(code)
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default()
        };
        Self {
            labels: split(DATA_LABELS),
            units: split(DATA_UNITS),
        }
    }

    pub fn label(&self, column: usize) -> Option<&str> {
        self.labels
            .get(column)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn unit(&self, column: usize) -> Option<&str> {
        self.units
            .get(column)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// `"<label> (<unit>)"`, or just the label when the column has no unit.
    pub fn caption(&self, column: usize, fallback: &str) -> String {
        let label = self.label(column).unwrap_or(fallback);
        match self.unit(column) {
            Some(unit) => format!("{label} ({unit})"),
            None => label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub source: PathBuf,
    pub title: String,
    pub axes: AxisMetadata,
    /// Destination path without extension; the renderer appends the format's extension.
    pub dest_stem: PathBuf,
    pub format: PlotImageFormat,
}

impl PlotRequest {
    pub fn output_path(&self) -> PathBuf {
        let mut path: OsString = self.dest_stem.clone().into_os_string();
        path.push(".");
        path.push(self.format.extension());
        PathBuf::from(path)
    }
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("No plottable rows in '{path}'")]
    NoData { path: String },
    #[error("Non-numeric value '{value}' at row {row}, column {column} of '{path}'")]
    InvalidValue {
        path: String,
        row: usize,
        column: usize,
        value: String,
    },
    #[error("Plot rendering failed: {0}")]
    Render(String),
    #[error("Renderer reported success but produced no image at '{0}'")]
    MissingOutput(PathBuf),
    #[error("Plot generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Plot renderer panicked")]
    Panicked,
}

/// Renders a tabular file to an image.
pub trait PlotRenderer: Send + Sync {
    /// Writes the plot to `request.output_path()` and returns that path.
    fn render(&self, request: &PlotRequest) -> Result<PathBuf, PlotError>;
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
