use crate::core::models::experiment::{AnalysisFile, ExperimentRecord, ExperimentSummary};
use crate::core::models::format::FileFormat;
use crate::core::models::metadata::AttributeValueSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid manifest '{path}': {message}")]
    Invalid { path: String, message: String },
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SummarySection {
    #[serde(default, rename = "molecular-systems")]
    molecular_systems: Vec<String>,
    #[serde(default)]
    tasks: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileEntry {
    path: PathBuf,
    name: Option<String>,
    format: Option<String>,
    #[serde(default)]
    metadata: AttributeValueSet,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    name: String,
    description: Option<String>,
    #[serde(default)]
    metadata: AttributeValueSet,
    #[serde(default)]
    summary: SummarySection,
    #[serde(default)]
    files: Vec<FileEntry>,
}

/// TOML description of an experiment: its metadata and analysis files.
///
/// ```toml
/// name = "Lysozyme in water"
/// description = "10 ns NPT run"
///
/// [metadata]
/// COMPUTATIONAL_METHOD_NAME = "Molecular dynamics"
/// FORCE_FIELD = ["AMBER99SB-ILDN", "TIP3P"]
///
/// [[files]]
/// path = "analysis/rmsd.csv"
/// metadata = { DATA_LABELS = "Time,RMSD", DATA_UNITS = "ns,nm" }
/// ```
pub struct ExperimentManifest;

impl ExperimentManifest {
    /// Loads the manifest at `path`. Relative file paths resolve against the
    /// manifest's directory.
    pub fn load(path: &Path) -> Result<ExperimentRecord, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&content, base).map_err(|e| match e {
            ParseFailure::Toml(source) => ManifestError::Toml {
                path: path.to_string_lossy().to_string(),
                source,
            },
            ParseFailure::Invalid(message) => ManifestError::Invalid {
                path: path.to_string_lossy().to_string(),
                message,
            },
        })
    }

    fn parse(content: &str, base: &Path) -> Result<ExperimentRecord, ParseFailure> {
        let manifest: ManifestFile = toml::from_str(content).map_err(ParseFailure::Toml)?;
        if manifest.name.trim().is_empty() {
            return Err(ParseFailure::Invalid(
                "experiment name must not be empty".to_string(),
            ));
        }

        let mut record = ExperimentRecord::new(manifest.name).with_metadata(manifest.metadata);
        record.description = manifest.description;
        record.summary = ExperimentSummary {
            molecular_systems: manifest.summary.molecular_systems,
            tasks: manifest.summary.tasks,
        };

        for entry in manifest.files {
            let resolved = if entry.path.is_absolute() {
                entry.path
            } else {
                base.join(entry.path)
            };
            let mut file = AnalysisFile::new(resolved).with_metadata(entry.metadata);
            if let Some(name) = entry.name {
                file.name = name;
            }
            if let Some(format) = entry.format {
                let Ok(format) = format.parse::<FileFormat>();
                file = file.with_format(format);
            }
            debug!("Manifest file {:?} ({})", file.path, file.format);
            record.add_file(file);
        }
        Ok(record)
    }
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(String),
}
