//! # Gadget - local container image catalog
//!
//! Gadget keeps a searchable, relational index of the container images a
//! runtime has reported. Each image is stored as an aggregate:
//! - the image row (short/long id, creation time, sizes)
//! - its tags, labels and volumes
//! - a blob with the raw summary and detail JSON
//!
//! The catalog lives in a single SQLite file and is queried by identity,
//! tag, or label/volume substring.

pub mod config;
pub mod format;
pub mod image;
pub mod source;
pub mod storage;
pub mod ui;

use std::path::PathBuf;

// Re-exports for convenient access
pub use config::{CatalogConfig, CatalogPaths};
pub use image::{Image, ImageBlob, ImageLabel, ImageTag, ImageVolume};
pub use source::{ContainerConfig, ImageDetails, ImageSummary, IngestRecord};
pub use storage::{CatalogStore, Preload, SchemaWarning};

/// Result type alias for Gadget operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Gadget operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unavailable(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::StorageUnavailable {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
