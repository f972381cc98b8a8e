//! Snapshot metadata descriptor (`metadata.json`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current snapshot format version
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Describes the store a snapshot was taken from.
///
/// Informational only: loading never depends on it, and older snapshots
/// that lack the newer fields still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Short type name of the record schema
    pub schema_name: String,
    /// Number of canonical records written
    pub size: usize,
    /// Fields rendered into search documents
    #[serde(default)]
    pub fields_for_index: Vec<String>,
    /// Registered lookup names, in creation order
    #[serde(default)]
    pub lookups: Vec<String>,
    /// Snapshot format version
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// When the snapshot was written
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

fn default_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

impl SnapshotMetadata {
    /// Metadata stamped with the current time and format version
    pub fn new(schema_name: impl Into<String>, size: usize) -> Self {
        Self {
            schema_name: schema_name.into(),
            size,
            fields_for_index: Vec::new(),
            lookups: Vec::new(),
            format_version: SNAPSHOT_FORMAT_VERSION,
            saved_at: Some(Utc::now()),
        }
    }

    /// Builder: set indexed fields
    pub fn with_fields_for_index(mut self, fields: Vec<String>) -> Self {
        self.fields_for_index = fields;
        self
    }

    /// Builder: set lookup names
    pub fn with_lookups(mut self, lookups: Vec<String>) -> Self {
        self.lookups = lookups;
        self
    }
}
