//! SQLite storage implementation

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Params, params};
use tracing::{debug, info, warn};

use super::preload::{Preload, row_to_tag};
use super::schema::{self, DEPENDENT_TABLES, TABLES, Table};
use crate::config::CatalogPaths;
use crate::image::Image;
use crate::source::{ImageDetails, ImageSummary};
use crate::{Error, Result};

const SELECT_IMAGES: &str = "SELECT images.id, images.short_id, images.long_id, images.created_at, images.size, images.virtual_size FROM images";
const SELECT_DISTINCT_IMAGES: &str = "SELECT DISTINCT images.id, images.short_id, images.long_id, images.created_at, images.size, images.virtual_size FROM images";

/// SQLite-backed catalog of image aggregates.
///
/// Owns a single connection. Build the schema with
/// [`rebuild_schema`](Self::rebuild_schema) before the first write.
pub struct CatalogStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl CatalogStore {
    /// Open the catalog file, creating its directory and the file itself
    /// when missing.
    pub fn open(paths: &CatalogPaths) -> Result<Self> {
        let directory = &paths.directory;
        if !directory.exists() {
            std::fs::create_dir_all(directory).map_err(|e| Error::unavailable(directory, e))?;
        }

        let path = paths.database_path();
        let conn = Connection::open(&path).map_err(|e| Error::unavailable(&path, e))?;
        info!("Opened catalog at {}", path.display());

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Open an in-memory catalog (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::unavailable(":memory:", e))?;
        Ok(Self { conn, path: None })
    }

    /// Backing file, `None` for in-memory catalogs
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Release the connection.
    pub fn close(self) -> Result<()> {
        let path = self.path.unwrap_or_else(|| PathBuf::from(":memory:"));
        self.conn
            .close()
            .map_err(|(_, e)| Error::unavailable(&path, e))?;
        info!("Closed catalog at {}", path.display());
        Ok(())
    }

    // ========== Schema ==========

    /// Drop every catalog table that exists and create all of them afresh.
    ///
    /// Destroys all ingested data. Individual failures are logged and
    /// returned as warnings; the rebuild always moves on to the next table.
    pub fn rebuild_schema(&self) -> Vec<SchemaWarning> {
        let mut warnings = Vec::new();

        for table in TABLES.iter().rev() {
            match self.has_table(table.name) {
                Ok(true) => {
                    debug!("{} already exists, removing it", table.name);
                    if let Err(e) = self.conn.execute(&schema::drop_statement(table), []) {
                        warnings.push(SchemaWarning::new(table, SchemaAction::Drop, e));
                    }
                }
                Ok(false) => {}
                Err(e) => warnings.push(SchemaWarning::new(table, SchemaAction::Inspect, e)),
            }
        }

        for table in TABLES {
            if let Err(e) = self.create_table(table) {
                warnings.push(SchemaWarning::new(table, SchemaAction::Create, e));
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        warnings
    }

    fn create_table(&self, table: &Table) -> rusqlite::Result<()> {
        self.conn.execute_batch(table.create)?;
        for index in table.indexes {
            self.conn.execute(index, [])?;
        }
        Ok(())
    }

    /// Check whether a table exists
    pub fn has_table(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ========== Ingestion ==========

    /// Store an image aggregate built from the runtime's records.
    ///
    /// The image and all its dependents are written in one transaction. An
    /// image already stored under the same long id is replaced. Returns the
    /// aggregate as persisted, row ids included.
    pub fn put(&self, summary: &ImageSummary, details: &ImageDetails) -> Result<Image> {
        let mut image = Image::from_records(summary, details)?;
        debug!("[{}] adding as {}", summary.tags().join(", "), image.short_id);

        let tx = self.conn.unchecked_transaction()?;

        if let Some(previous) = delete_aggregate(&tx, &image.long_id)? {
            debug!("replacing previous entry {} for {}", previous, image.short_id);
        }

        tx.execute(
            r#"
            INSERT INTO images (short_id, long_id, created_at, size, virtual_size)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                image.short_id,
                image.long_id,
                image.created_at,
                image.size,
                image.virtual_size,
            ],
        )?;
        image.id = tx.last_insert_rowid();

        for tag in &mut image.tags {
            tx.execute(
                "INSERT INTO image_tags (image_id, name, version, tag) VALUES (?1, ?2, ?3, ?4)",
                params![image.id, tag.name, tag.version, tag.tag],
            )?;
            tag.id = tx.last_insert_rowid();
            tag.image_id = image.id;
        }

        for label in &mut image.labels {
            tx.execute(
                "INSERT INTO image_labels (image_id, key, value, label) VALUES (?1, ?2, ?3, ?4)",
                params![image.id, label.key, label.value, label.label],
            )?;
            label.id = tx.last_insert_rowid();
            label.image_id = image.id;
        }

        for volume in &mut image.volumes {
            tx.execute(
                "INSERT INTO image_volumes (image_id, volume, data) VALUES (?1, ?2, ?3)",
                params![image.id, volume.volume, volume.data],
            )?;
            volume.id = tx.last_insert_rowid();
            volume.image_id = image.id;
        }

        tx.execute(
            "INSERT INTO image_blobs (image_id, summary, details) VALUES (?1, ?2, ?3)",
            params![image.id, image.blob.summary, image.blob.details],
        )?;
        image.blob.id = tx.last_insert_rowid();
        image.blob.image_id = image.id;

        tx.commit()?;
        Ok(image)
    }

    // ========== Retrieval ==========

    /// All images with every relation loaded
    pub fn get_all(&self) -> Result<Vec<Image>> {
        self.query_images(&format!("{SELECT_IMAGES} ORDER BY images.id"), [], Preload::ALL)
    }

    /// Same as [`find_by_short_id`](Self::find_by_short_id)
    pub fn get(&self, short_id: &str) -> Result<Image> {
        self.find_by_short_id(short_id)
    }

    /// True iff some image has this short id
    pub fn exists(&self, short_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM images WHERE short_id = ?1",
            [short_id],
            |row| row.get(0),
        )?;
        debug!("Searching image with id {} - {}", short_id, count);
        Ok(count > 0)
    }

    /// First image with this short id, or the zero-value image.
    ///
    /// Distinct long ids may share a short id; the earliest stored wins.
    pub fn find_by_short_id(&self, short_id: &str) -> Result<Image> {
        self.first_image("images.short_id = ?1", [short_id], Preload::ALL)
    }

    /// Image with this long id, or the zero-value image
    pub fn find_by_long_id(&self, long_id: &str) -> Result<Image> {
        self.first_image("images.long_id = ?1", [long_id], Preload::ALL)
    }

    /// Image owning the first tag row equal to `tag`, without its blob.
    pub fn find_by_tag(&self, tag: &str) -> Result<Image> {
        let found = self
            .conn
            .query_row(
                "SELECT id, image_id, name, version, tag FROM image_tags WHERE tag = ?1 ORDER BY id LIMIT 1",
                [tag],
                row_to_tag,
            )
            .optional()?;

        match found {
            Some(image_tag) => {
                self.first_image("images.id = ?1", [image_tag.image_id], Preload::COLLECTIONS)
            }
            None => {
                debug!("No tag found for {}", tag);
                Ok(Image::default())
            }
        }
    }

    /// Images having at least one label
    pub fn get_images_with_labels(&self) -> Result<Vec<Image>> {
        self.query_images(
            &format!(
                "{SELECT_DISTINCT_IMAGES} INNER JOIN image_labels ON image_labels.image_id = images.id ORDER BY images.id"
            ),
            [],
            Preload::COLLECTIONS,
        )
    }

    /// Images with a `key:value` label containing `pattern` (case-sensitive)
    pub fn get_images_by_label(&self, pattern: &str) -> Result<Vec<Image>> {
        self.query_images(
            &format!(
                "{SELECT_DISTINCT_IMAGES} INNER JOIN image_labels ON image_labels.image_id = images.id \
                 WHERE instr(image_labels.label, ?1) > 0 ORDER BY images.id"
            ),
            [pattern],
            Preload::TAGS_AND_LABELS,
        )
    }

    /// Images having at least one volume
    pub fn get_images_with_volumes(&self) -> Result<Vec<Image>> {
        self.query_images(
            &format!(
                "{SELECT_DISTINCT_IMAGES} INNER JOIN image_volumes ON image_volumes.image_id = images.id ORDER BY images.id"
            ),
            [],
            Preload::TAGS_AND_VOLUMES,
        )
    }

    /// Images with a volume name containing `pattern` (case-sensitive)
    pub fn get_images_by_volume(&self, pattern: &str) -> Result<Vec<Image>> {
        self.query_images(
            &format!(
                "{SELECT_DISTINCT_IMAGES} INNER JOIN image_volumes ON image_volumes.image_id = images.id \
                 WHERE instr(image_volumes.volume, ?1) > 0 ORDER BY images.id"
            ),
            [pattern],
            Preload::TAGS_AND_VOLUMES,
        )
    }

    /// Get catalog statistics
    pub fn stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            images: self.count_rows("images")?,
            tags: self.count_rows("image_tags")?,
            labels: self.count_rows("image_labels")?,
            volumes: self.count_rows("image_volumes")?,
            blobs: self.count_rows("image_blobs")?,
        })
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_images<P: Params>(&self, sql: &str, params: P, preload: Preload) -> Result<Vec<Image>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut images = stmt
            .query_map(params, row_to_image)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        preload.apply(&self.conn, &mut images)?;
        Ok(images)
    }

    fn first_image<P: Params>(&self, filter: &str, params: P, preload: Preload) -> Result<Image> {
        let sql = format!("{SELECT_IMAGES} WHERE {filter} ORDER BY images.id LIMIT 1");
        let found = self.conn.query_row(&sql, params, row_to_image).optional()?;

        let Some(image) = found else {
            return Ok(Image::default());
        };

        let mut images = [image];
        preload.apply(&self.conn, &mut images)?;
        let [image] = images;
        Ok(image)
    }
}

/// Remove an image and everything it owns. Returns the removed row id.
fn delete_aggregate(conn: &Connection, long_id: &str) -> Result<Option<i64>> {
    let existing: Option<i64> = conn
        .query_row("SELECT id FROM images WHERE long_id = ?1", [long_id], |row| row.get(0))
        .optional()?;

    if let Some(id) = existing {
        for table in DEPENDENT_TABLES {
            conn.execute(&format!("DELETE FROM {} WHERE image_id = ?1", table.name), [id])?;
        }
        conn.execute("DELETE FROM images WHERE id = ?1", [id])?;
    }

    Ok(existing)
}

fn row_to_image(row: &rusqlite::Row) -> rusqlite::Result<Image> {
    Ok(Image {
        id: row.get(0)?,
        short_id: row.get(1)?,
        long_id: row.get(2)?,
        created_at: row.get(3)?,
        size: row.get(4)?,
        virtual_size: row.get(5)?,
        ..Default::default()
    })
}

/// Step of the schema rebuild that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaAction {
    Inspect,
    Drop,
    Create,
}

impl SchemaAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaAction::Inspect => "inspect",
            SchemaAction::Drop => "drop",
            SchemaAction::Create => "create",
        }
    }
}

/// Non-fatal failure reported by [`CatalogStore::rebuild_schema`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaWarning {
    pub table: &'static str,
    pub action: SchemaAction,
    pub message: String,
}

impl SchemaWarning {
    fn new(table: &Table, action: SchemaAction, error: impl std::fmt::Display) -> Self {
        Self {
            table: table.name,
            action,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to {} table {}: {}", self.action.as_str(), self.table, self.message)
    }
}

/// Catalog statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CatalogStats {
    pub images: usize,
    pub tags: usize,
    pub labels: usize,
    pub volumes: usize,
    pub blobs: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Statistics:")?;
        writeln!(f, "  Images: {}", self.images)?;
        writeln!(f, "  Tags: {}", self.tags)?;
        writeln!(f, "  Labels: {}", self.labels)?;
        writeln!(f, "  Volumes: {}", self.volumes)?;
        writeln!(f, "  Blobs: {}", self.blobs)
    }
}
