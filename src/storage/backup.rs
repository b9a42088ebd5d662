//! Backup of the catalog file
//!
//! A plain byte copy next to the original (`<file>.bkp`). Writers are not
//! paused; quiesce ingestion first for a consistent snapshot.

use std::path::PathBuf;

use tracing::info;

use crate::config::CatalogPaths;
use crate::{Error, Result};

/// Copy the catalog file to its backup path, replacing any earlier backup.
pub fn backup(paths: &CatalogPaths) -> Result<PathBuf> {
    if !paths.directory.is_dir() {
        return Err(Error::PathNotFound(paths.directory.clone()));
    }

    let source = paths.database_path();
    let target = paths.backup_path();
    let bytes = std::fs::copy(&source, &target)?;
    info!("Backed up {} ({} bytes) to {}", source.display(), bytes, target.display());

    Ok(target)
}
