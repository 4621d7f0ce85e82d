use thiserror::Error;

use super::assembler::BuildState;
use super::config::ConfigError;
use super::formatter::FormatError;
use crate::core::catalog::LookupError;
use crate::core::io::pdf::PdfError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Metadata lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Malformed value for attribute '{code}': {source}")]
    Format { code: String, source: FormatError },

    #[error("Failed to render report: {0}")]
    Render(#[from] PdfError),

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Report builder used out of order: expected state {expected:?}, found {found:?}")]
    InvalidState {
        expected: BuildState,
        found: BuildState,
    },
}

impl EngineError {
    /// Schema errors come from the experiment's metadata rather than the environment.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Lookup(_) | Self::Format { .. })
    }
}
