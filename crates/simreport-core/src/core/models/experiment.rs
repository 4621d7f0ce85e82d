use super::format::FileFormat;
use super::metadata::AttributeValueSet;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A single analysis artifact attached to an experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFile {
    pub path: PathBuf,
    pub name: String,
    pub format: FileFormat,
    /// Per-file metadata, e.g. axis labels and units of tabular data.
    pub metadata: AttributeValueSet,
}

impl AnalysisFile {
    /// Creates a file entry whose name and format are derived from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = FileFormat::from_path(&path);
        Self {
            path,
            name,
            format,
            metadata: AttributeValueSet::new(),
        }
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_metadata(mut self, metadata: AttributeValueSet) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Free-text summaries of the molecular systems and tasks behind an experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentSummary {
    pub molecular_systems: Vec<String>,
    pub tasks: Vec<String>,
}

/// Read-only input of a report build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentRecord {
    pub name: String,
    pub description: Option<String>,
    pub metadata: AttributeValueSet,
    pub summary: ExperimentSummary,
    files: BTreeMap<FileFormat, Vec<AnalysisFile>>,
}

impl ExperimentRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, metadata: AttributeValueSet) -> Self {
        self.metadata = metadata;
        self
    }

    /// Adds a file under its format group, after any file already in that group.
    pub fn add_file(&mut self, file: AnalysisFile) {
        self.files.entry(file.format.clone()).or_default().push(file);
    }

    pub fn with_file(mut self, file: AnalysisFile) -> Self {
        self.add_file(file);
        self
    }

    pub fn files_by_format(&self) -> &BTreeMap<FileFormat, Vec<AnalysisFile>> {
        &self.files
    }

    pub fn files_of(&self, format: &FileFormat) -> &[AnalysisFile] {
        self.files.get(format).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Static images in grid order: JPEG, PNG, BMP, GIF, each group in insertion order.
    pub fn static_images(&self) -> impl Iterator<Item = &AnalysisFile> {
        FileFormat::STATIC_IMAGE_ORDER
            .iter()
            .flat_map(|format| self.files_of(format).iter())
    }

    pub fn tabular_files(&self) -> &[AnalysisFile] {
        self.files_of(&FileFormat::Csv)
    }

    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}
