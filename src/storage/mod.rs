//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with tables:
//! - images(short_id, long_id, created_at, size, virtual_size)
//! - image_tags(image_id, name, version, tag)
//! - image_labels(image_id, key, value, label)
//! - image_volumes(image_id, volume, data)
//! - image_blobs(image_id, summary, details)

pub mod backup;
pub mod preload;
pub mod schema;
pub mod sqlite;

pub use backup::backup;
pub use preload::Preload;
pub use sqlite::{CatalogStats, CatalogStore, SchemaAction, SchemaWarning};
