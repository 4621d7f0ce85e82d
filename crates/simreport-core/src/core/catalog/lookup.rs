use super::codes::STANDARD_TERMS;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Display information of one attribute code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub code: String,
    pub term: String,
    /// Standard attributes display `term`; free-text attributes display `code`.
    pub standard: bool,
}

impl AttributeDescriptor {
    pub fn standard(code: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            term: term.into(),
            standard: true,
        }
    }

    pub fn free_text(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            term: code.clone(),
            code,
            standard: false,
        }
    }

    pub fn label(&self) -> &str {
        if self.standard { &self.term } else { &self.code }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LookupError {
    #[error("Unknown attribute code '{code}': no descriptor in the metadata catalog")]
    UnknownAttribute { code: String },
}

/// Maps attribute codes to display descriptors.
///
/// Implementations must be deterministic and answer every code the engine asks
/// about; an unknown code aborts the build.
pub trait AttributeResolver: Send + Sync {
    fn resolve(&self, code: &str) -> Result<AttributeDescriptor, LookupError>;
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct CatalogEntry {
    term: String,
    #[serde(default = "default_standard")]
    standard: bool,
}

fn default_standard() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
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
}

/// Attribute catalog backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct AttributeCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding a standard term for every code the engine queries.
    pub fn builtin() -> Self {
        let entries = STANDARD_TERMS
            .entries()
            .map(|(code, term)| {
                (
                    code.to_string(),
                    CatalogEntry {
                        term: term.to_string(),
                        standard: true,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Loads a catalog from a TOML table of `CODE = { term = "...", standard = true }`.
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let entries: BTreeMap<String, CatalogEntry> =
            toml::from_str(&content).map_err(|e| CatalogLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        Ok(Self { entries })
    }

    pub fn insert(&mut self, descriptor: AttributeDescriptor) {
        self.entries.insert(
            descriptor.code,
            CatalogEntry {
                term: descriptor.term,
                standard: descriptor.standard,
            },
        );
    }

    /// Adds every entry of `other`, replacing entries with the same code.
    pub fn merge(mut self, other: AttributeCatalog) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AttributeDescriptor> + '_ {
        self.entries.iter().map(|(code, entry)| AttributeDescriptor {
            code: code.clone(),
            term: entry.term.clone(),
            standard: entry.standard,
        })
    }
}

impl AttributeResolver for AttributeCatalog {
    fn resolve(&self, code: &str) -> Result<AttributeDescriptor, LookupError> {
        self.entries
            .get(code)
            .map(|entry| AttributeDescriptor {
                code: code.to_string(),
                term: entry.term.clone(),
                standard: entry.standard,
            })
            .ok_or_else(|| LookupError::UnknownAttribute {
                code: code.to_string(),
            })
    }
}
