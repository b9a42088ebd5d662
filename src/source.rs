//! Inbound records from the image-enumeration side
//!
//! Field names follow the container runtime's API (PascalCase). Fields the
//! catalog does not interpret are kept in `extra` so the blob JSON carries
//! the full record.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Image summary as listed by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageSummary {
    pub id: String,
    /// Creation time in epoch nanoseconds
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub virtual_size: i64,
    #[serde(default)]
    pub repo_tags: Option<Vec<String>>,
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn tags(&self) -> &[String] {
        self.repo_tags.as_deref().unwrap_or(&[])
    }

    pub fn labels(&self) -> impl Iterator<Item = (&String, &String)> {
        self.labels.iter().flatten()
    }
}

/// Detailed inspect record. Only the volume configuration is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDetails {
    #[serde(rename = "ContainerConfig", default)]
    pub container_config: ContainerConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageDetails {
    pub fn volumes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.container_config.volumes.iter().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(rename = "Volumes", default)]
    pub volumes: Option<BTreeMap<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One summary/detail pair, the unit of ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestRecord {
    pub summary: ImageSummary,
    #[serde(default)]
    pub details: ImageDetails,
}

impl IngestRecord {
    /// Read a JSON array of records from a file
    pub fn load_all(path: &Path) -> Result<Vec<IngestRecord>> {
        let contents = std::fs::read_to_string(path)?;
        let records = serde_json::from_str(&contents)?;
        Ok(records)
    }
}
