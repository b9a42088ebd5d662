//! Image aggregate - the catalog's entity model
//!
//! An [`Image`] is the root of an aggregate that exclusively owns:
//! - `tags`: `name:version` references
//! - `labels`: key/value pairs plus the `key:value` composite
//! - `volumes`: volume names with their JSON descriptor
//! - `blob`: the raw summary and detail JSON (always exactly one)
//!
//! Row ids are assigned by storage; a freshly built value carries `0`.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::format;
use crate::source::{ImageDetails, ImageSummary};

/// Length of the runtime's canonical short identity.
pub const SHORT_ID_LEN: usize = 12;

/// Shorten a full image id the way the container runtime does: drop any
/// `algorithm:` prefix and keep the first twelve characters.
pub fn truncate_id(id: &str) -> String {
    let id = match id.split_once(':') {
        Some((_, digest)) => digest,
        None => id,
    };
    id.chars().take(SHORT_ID_LEN).collect()
}

/// A catalogued image with whichever relations were preloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub short_id: String,
    pub long_id: String,
    pub created_at: String,
    pub size: String,
    pub virtual_size: String,
    pub tags: Vec<ImageTag>,
    pub labels: Vec<ImageLabel>,
    pub volumes: Vec<ImageVolume>,
    pub blob: ImageBlob,
}

impl Image {
    /// Assemble a new aggregate from the runtime's summary and detail
    /// records. Tags keep `RepoTags` order; labels and volumes follow key
    /// order.
    pub fn from_records(summary: &ImageSummary, details: &ImageDetails) -> Result<Self> {
        let tags = summary.tags().iter().map(|t| ImageTag::parse(t)).collect();
        let labels = summary.labels().map(|(k, v)| ImageLabel::new(k, v)).collect();
        let volumes = details
            .volumes()
            .map(|(name, descriptor)| Ok(ImageVolume::new(name, serde_json::to_string(descriptor)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: 0,
            short_id: truncate_id(&summary.id),
            long_id: summary.id.clone(),
            created_at: format::created_at(summary.created),
            size: format::signed_byte_size(summary.size),
            virtual_size: format::signed_byte_size(summary.virtual_size),
            tags,
            labels,
            volumes,
            blob: ImageBlob {
                summary: serde_json::to_string(summary)?,
                details: serde_json::to_string(details)?,
                ..Default::default()
            },
        })
    }

    /// True for the zero-value image returned by a lookup miss.
    pub fn is_empty(&self) -> bool {
        self.long_id.is_empty()
    }

    /// Full tag strings in insertion order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.tag.as_str()).collect()
    }
}

/// A repository tag of the form `name:version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTag {
    pub id: i64,
    pub image_id: i64,
    pub name: String,
    pub version: String,
    pub tag: String,
}

impl ImageTag {
    /// Split a tag on its first `:`. A tag without a separator keeps the
    /// whole string as `name` and gets an empty `version`.
    pub fn parse(tag: &str) -> Self {
        let (name, version) = tag.split_once(':').unwrap_or((tag, ""));
        Self {
            id: 0,
            image_id: 0,
            name: name.to_string(),
            version: version.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// A label with its precomputed `key:value` search composite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLabel {
    pub id: i64,
    pub image_id: i64,
    pub key: String,
    pub value: String,
    pub label: String,
}

impl ImageLabel {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            id: 0,
            image_id: 0,
            key: key.to_string(),
            value: value.to_string(),
            label: format!("{}:{}", key, value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVolume {
    pub id: i64,
    pub image_id: i64,
    pub volume: String,
    /// JSON-encoded volume descriptor
    pub data: String,
}

impl ImageVolume {
    pub fn new(volume: &str, data: String) -> Self {
        Self {
            id: 0,
            image_id: 0,
            volume: volume.to_string(),
            data,
        }
    }
}

/// Raw JSON snapshots of the image as reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlob {
    pub id: i64,
    pub image_id: i64,
    pub summary: String,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_id() {
        assert_eq!(
            truncate_id("sha256:a40c03cbb81c59bfb0e0887ab0b1859727075da7b9cc576a1cec2c771f38c5fb"),
            "a40c03cbb81c"
        );
        assert_eq!(truncate_id("abc123def456789"), "abc123def456");
        assert_eq!(truncate_id("short"), "short");
        assert_eq!(truncate_id(""), "");
    }

    #[test]
    fn test_tag_parse() {
        let tag = ImageTag::parse("app:1.0");
        assert_eq!(tag.name, "app");
        assert_eq!(tag.version, "1.0");
        assert_eq!(tag.tag, "app:1.0");
    }

    #[test]
    fn test_tag_parse_without_separator() {
        let tag = ImageTag::parse("<none>");
        assert_eq!(tag.name, "<none>");
        assert_eq!(tag.version, "");
        assert_eq!(tag.tag, "<none>");
    }

    #[test]
    fn test_tag_parse_splits_on_first_colon() {
        let tag = ImageTag::parse("registry:5000/app:1.0");
        assert_eq!(tag.name, "registry");
        assert_eq!(tag.version, "5000/app:1.0");
    }

    #[test]
    fn test_label_composite() {
        let label = ImageLabel::new("env", "prod");
        assert_eq!(label.label, "env:prod");
    }

    #[test]
    fn test_from_records() {
        let mut summary = ImageSummary::new("sha256:0123456789abcdef0123");
        summary.size = 2048;
        summary.virtual_size = 3 * 1024 * 1024;
        summary.repo_tags = Some(vec!["app:1.0".into(), "app:latest".into()]);
        summary.labels = Some([("env".to_string(), "prod".to_string())].into());

        let mut details = ImageDetails::default();
        details.container_config.volumes =
            Some([("/data".to_string(), serde_json::json!({}))].into());

        let image = Image::from_records(&summary, &details).unwrap();
        assert_eq!(image.short_id, "0123456789ab");
        assert_eq!(image.long_id, "sha256:0123456789abcdef0123");
        assert_eq!(image.size, "2K");
        assert_eq!(image.virtual_size, "3M");
        assert_eq!(image.tag_names(), ["app:1.0", "app:latest"]);
        assert_eq!(image.labels[0].label, "env:prod");
        assert_eq!(image.volumes[0].volume, "/data");
        assert_eq!(image.volumes[0].data, "{}");

        let decoded: ImageSummary = serde_json::from_str(&image.blob.summary).unwrap();
        assert_eq!(decoded, summary);
        let decoded: ImageDetails = serde_json::from_str(&image.blob.details).unwrap();
        assert_eq!(decoded, details);
    }

    #[test]
    fn test_default_image_is_empty() {
        assert!(Image::default().is_empty());
        let image = Image {
            long_id: "abc".into(),
            ..Default::default()
        };
        assert!(!image.is_empty());
    }
}
