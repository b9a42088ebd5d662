//! Eager loading of image relations
//!
//! Every read names the relations it materializes up front; there is no
//! lazy traversal. Relations are fetched with one `IN (...)` query per
//! table for the whole result set.

use std::collections::HashMap;

use rusqlite::{Connection, Row, params_from_iter};

use crate::Result;
use crate::image::{Image, ImageBlob, ImageLabel, ImageTag, ImageVolume};

/// Stay well under SQLite's bound-parameter limit.
const MAX_IDS_PER_QUERY: usize = 500;

/// Which relations a read materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preload {
    pub blob: bool,
    pub volumes: bool,
    pub tags: bool,
    pub labels: bool,
}

impl Preload {
    pub const NONE: Preload = Preload { blob: false, volumes: false, tags: false, labels: false };
    pub const ALL: Preload = Preload { blob: true, volumes: true, tags: true, labels: true };
    /// Used by tag lookup and the any-label listing
    pub const COLLECTIONS: Preload = Preload { blob: false, volumes: true, tags: true, labels: true };
    pub const TAGS_AND_LABELS: Preload = Preload { blob: false, volumes: false, tags: true, labels: true };
    pub const TAGS_AND_VOLUMES: Preload = Preload { blob: false, volumes: true, tags: true, labels: false };

    pub(crate) fn apply(&self, conn: &Connection, images: &mut [Image]) -> Result<()> {
        if images.is_empty() || *self == Preload::NONE {
            return Ok(());
        }

        let ids: Vec<i64> = images.iter().map(|i| i.id).collect();

        if self.tags {
            let mut tags = load_related(
                conn,
                "SELECT id, image_id, name, version, tag FROM image_tags",
                &ids,
                row_to_tag,
                |t: &ImageTag| t.image_id,
            )?;
            for image in images.iter_mut() {
                image.tags = tags.remove(&image.id).unwrap_or_default();
            }
        }

        if self.labels {
            let mut labels = load_related(
                conn,
                "SELECT id, image_id, key, value, label FROM image_labels",
                &ids,
                row_to_label,
                |l: &ImageLabel| l.image_id,
            )?;
            for image in images.iter_mut() {
                image.labels = labels.remove(&image.id).unwrap_or_default();
            }
        }

        if self.volumes {
            let mut volumes = load_related(
                conn,
                "SELECT id, image_id, volume, data FROM image_volumes",
                &ids,
                row_to_volume,
                |v: &ImageVolume| v.image_id,
            )?;
            for image in images.iter_mut() {
                image.volumes = volumes.remove(&image.id).unwrap_or_default();
            }
        }

        if self.blob {
            let mut blobs = load_related(
                conn,
                "SELECT id, image_id, summary, details FROM image_blobs",
                &ids,
                row_to_blob,
                |b: &ImageBlob| b.image_id,
            )?;
            for image in images.iter_mut() {
                image.blob = blobs
                    .remove(&image.id)
                    .and_then(|mut b| b.pop())
                    .unwrap_or_default();
            }
        }

        Ok(())
    }
}

/// Fetch rows of a dependent table for the given image ids, grouped by
/// owner and kept in insertion (row id) order.
fn load_related<T>(
    conn: &Connection,
    select: &str,
    image_ids: &[i64],
    map_row: fn(&Row) -> rusqlite::Result<T>,
    owner: fn(&T) -> i64,
) -> Result<HashMap<i64, Vec<T>>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();

    for chunk in image_ids.chunks(MAX_IDS_PER_QUERY) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("{select} WHERE image_id IN ({placeholders}) ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params_from_iter(chunk.iter()), map_row)?
            .collect::<rusqlite::Result<Vec<T>>>()?;

        for row in rows {
            grouped.entry(owner(&row)).or_default().push(row);
        }
    }

    Ok(grouped)
}

pub(crate) fn row_to_tag(row: &Row) -> rusqlite::Result<ImageTag> {
    Ok(ImageTag {
        id: row.get(0)?,
        image_id: row.get(1)?,
        name: row.get(2)?,
        version: row.get(3)?,
        tag: row.get(4)?,
    })
}

fn row_to_label(row: &Row) -> rusqlite::Result<ImageLabel> {
    Ok(ImageLabel {
        id: row.get(0)?,
        image_id: row.get(1)?,
        key: row.get(2)?,
        value: row.get(3)?,
        label: row.get(4)?,
    })
}

fn row_to_volume(row: &Row) -> rusqlite::Result<ImageVolume> {
    Ok(ImageVolume {
        id: row.get(0)?,
        image_id: row.get(1)?,
        volume: row.get(2)?,
        data: row.get(3)?,
    })
}

fn row_to_blob(row: &Row) -> rusqlite::Result<ImageBlob> {
    Ok(ImageBlob {
        id: row.get(0)?,
        image_id: row.get(1)?,
        summary: row.get(2)?,
        details: row.get(3)?,
    })
}
