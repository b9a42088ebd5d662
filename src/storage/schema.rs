//! Database schema definitions
//!
//! `image_id` columns reference `images(id)` but foreign keys are left
//! unenforced; dependents are removed explicitly with their image.

/// A table and the statements that create it.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub create: &'static str,
    pub indexes: &'static [&'static str],
}

pub const IMAGES: Table = Table {
    name: "images",
    create: r#"
CREATE TABLE images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    short_id TEXT NOT NULL,
    long_id TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    size TEXT NOT NULL,
    virtual_size TEXT NOT NULL
)
"#,
    indexes: &["CREATE INDEX idx_images_short_id ON images(short_id)"],
};

pub const IMAGE_TAGS: Table = Table {
    name: "image_tags",
    create: r#"
CREATE TABLE image_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL REFERENCES images(id),
    name TEXT NOT NULL,
    version TEXT NOT NULL,
    tag TEXT NOT NULL
)
"#,
    indexes: &[
        "CREATE INDEX idx_image_tags_image ON image_tags(image_id)",
        "CREATE INDEX idx_image_tags_tag ON image_tags(tag)",
    ],
};

pub const IMAGE_LABELS: Table = Table {
    name: "image_labels",
    create: r#"
CREATE TABLE image_labels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL REFERENCES images(id),
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    label TEXT NOT NULL
)
"#,
    indexes: &["CREATE INDEX idx_image_labels_image ON image_labels(image_id)"],
};

pub const IMAGE_VOLUMES: Table = Table {
    name: "image_volumes",
    create: r#"
CREATE TABLE image_volumes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL REFERENCES images(id),
    volume TEXT NOT NULL,
    data TEXT NOT NULL
)
"#,
    indexes: &["CREATE INDEX idx_image_volumes_image ON image_volumes(image_id)"],
};

pub const IMAGE_BLOBS: Table = Table {
    name: "image_blobs",
    create: r#"
CREATE TABLE image_blobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL UNIQUE REFERENCES images(id),
    summary TEXT NOT NULL,
    details TEXT NOT NULL
)
"#,
    indexes: &[],
};

/// All tables, root first.
pub const TABLES: &[Table] = &[IMAGES, IMAGE_TAGS, IMAGE_LABELS, IMAGE_VOLUMES, IMAGE_BLOBS];

/// Tables owned by an image, i.e. everything keyed by `image_id`.
pub const DEPENDENT_TABLES: &[Table] = &[IMAGE_TAGS, IMAGE_LABELS, IMAGE_VOLUMES, IMAGE_BLOBS];

pub fn drop_statement(table: &Table) -> String {
    format!("DROP TABLE {}", table.name)
}
