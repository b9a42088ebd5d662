use tabled::{settings::Style, Table, Tabled};

use crate::image::Image;
use crate::storage::CatalogStats;

#[derive(Tabled)]
pub struct ImageRow {
    #[tabled(rename = "Image ID")]
    pub short_id: String,
    #[tabled(rename = "Tags")]
    pub tags: String,
    #[tabled(rename = "Created")]
    pub created_at: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Virtual")]
    pub virtual_size: String,
    #[tabled(rename = "Labels")]
    pub labels: String,
    #[tabled(rename = "Volumes")]
    pub volumes: String,
}

impl From<&Image> for ImageRow {
    fn from(image: &Image) -> Self {
        Self {
            short_id: image.short_id.clone(),
            tags: image.tag_names().join("\n"),
            created_at: image.created_at.clone(),
            size: image.size.clone(),
            virtual_size: image.virtual_size.clone(),
            labels: image
                .labels
                .iter()
                .map(|l| l.label.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            volumes: image
                .volumes
                .iter()
                .map(|v| v.volume.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Tabled)]
pub struct StatRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Rows")]
    pub rows: usize,
}

pub fn image_table(images: &[Image]) -> String {
    if images.is_empty() {
        return String::new();
    }

    let rows: Vec<ImageRow> = images.iter().map(ImageRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &CatalogStats) -> String {
    let rows = [
        ("images", stats.images),
        ("image_tags", stats.tags),
        ("image_labels", stats.labels),
        ("image_volumes", stats.volumes),
        ("image_blobs", stats.blobs),
    ]
    .into_iter()
    .map(|(table, rows)| StatRow {
        table: table.to_string(),
        rows,
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageLabel, ImageTag};

    #[test]
    fn test_image_row() {
        let image = Image {
            short_id: "abc123def456".into(),
            long_id: "sha256:abc123def456".into(),
            tags: vec![ImageTag::parse("app:1.0"), ImageTag::parse("app:latest")],
            labels: vec![ImageLabel::new("env", "prod")],
            ..Default::default()
        };

        let row = ImageRow::from(&image);
        assert_eq!(row.tags, "app:1.0\napp:latest");
        assert_eq!(row.labels, "env:prod");
        assert!(row.volumes.is_empty());

        let table = image_table(&[image]);
        assert!(table.contains("abc123def456"));
        assert!(table.contains("Image ID"));
    }

    #[test]
    fn test_empty_tables() {
        assert!(image_table(&[]).is_empty());
        let table = stats_table(&CatalogStats::default());
        assert!(table.contains("image_blobs"));
    }
}
