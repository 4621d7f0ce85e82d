pub mod attributes;
pub mod build;

use crate::error::{CliError, Result};
use simreport::core::catalog::AttributeCatalog;
use std::path::Path;
use tracing::info;

/// The built-in catalog, with the entries of `extra` layered on top.
fn load_catalog(extra: Option<&Path>) -> Result<AttributeCatalog> {
    let catalog = AttributeCatalog::builtin();
    let Some(path) = extra else {
        return Ok(catalog);
    };
    info!("Merging attribute catalog from {:?}", path);
    let user = AttributeCatalog::load(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(catalog.merge(user))
}
