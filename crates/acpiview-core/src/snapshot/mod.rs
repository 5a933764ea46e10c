//! Record snapshots: decoded table metadata in YAML or JSON form.
//!
//! A snapshot stands in for the table decoders. Loading one encodes each
//! entry with the payload layouts from [`crate::layout`] and pushes it into a
//! [`DataStore`] in document order.

mod schema;

pub use schema::validate_snapshot_schema;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::catalog::Category;
use crate::config::signature_from_name;
use crate::layout::{encode_installed_signature, GiccEntry, PpttProcessor};
use crate::store::{DataStore, StoreError};

/// Errors that can occur when reading or loading a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Snapshot does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Failed to store record: {0}")]
    StoreError(#[from] StoreError),
}

/// One MADT GICC entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiccSpec {
    /// ACPI processor UID
    pub uid: u32,

    /// CPU interface number; defaults to the UID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_interface: Option<u32>,

    /// GICC flags; defaults to "enabled"
    #[serde(default = "default_gicc_flags")]
    pub flags: u32,
}

fn default_gicc_flags() -> u32 {
    1
}

impl GiccSpec {
    fn to_entry(&self) -> GiccEntry {
        GiccEntry {
            cpu_interface_number: self.cpu_interface.unwrap_or(self.uid),
            acpi_processor_uid: self.uid,
            flags: self.flags,
        }
    }
}

/// One PPTT processor hierarchy node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpttSpec {
    /// ACPI processor ID
    pub id: u32,

    /// Whether the node is a processing unit rather than a cluster
    #[serde(default = "default_leaf")]
    pub leaf: bool,

    /// Offset of the parent node
    #[serde(default)]
    pub parent: u32,
}

fn default_leaf() -> bool {
    true
}

impl PpttSpec {
    fn to_node(&self) -> PpttProcessor {
        let mut node = PpttProcessor::new(self.id, self.leaf);
        node.parent = self.parent;
        node
    }
}

/// A record given as raw bytes against a raw category index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub category: usize,

    /// Tag for the record; defaults to `category`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<usize>,

    pub data: Vec<u8>,
}

/// Decoded table metadata ready to be loaded into a [`DataStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSnapshot {
    /// Names of every installed table
    #[serde(default)]
    pub installed_tables: Vec<String>,

    /// MADT GICC structures, in table order
    #[serde(default)]
    pub madt_gicc: Vec<GiccSpec>,

    /// PPTT processor nodes, in table order
    #[serde(default)]
    pub pptt_processors: Vec<PpttSpec>,

    /// Pre-encoded records
    #[serde(default)]
    pub raw: Vec<RawRecord>,
}

impl RecordSnapshot {
    /// Parse a snapshot from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SnapshotError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a snapshot file; `.json` files are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, SnapshotError> {
        validate_snapshot_schema(&value).map_err(SnapshotError::SchemaError)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Total number of records this snapshot will push.
    pub fn len(&self) -> usize {
        self.installed_tables.len() + self.madt_gicc.len() + self.pptt_processors.len() + self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push every entry into `store`.
    ///
    /// Stops at the first store failure; records pushed before it stay.
    pub fn load_into(&self, store: &mut DataStore) -> Result<usize, SnapshotError> {
        for name in &self.installed_tables {
            let signature = encode_installed_signature(signature_from_name(name));
            store.store(Category::InstalledTables, Category::InstalledTables, &signature)?;
        }

        for gicc in &self.madt_gicc {
            store.store(Category::MadtGicC, Category::MadtGicC, &gicc.to_entry().encode())?;
        }

        for node in &self.pptt_processors {
            store.store(Category::PpttProcs, Category::PpttProcs, &node.to_node().encode())?;
        }

        for raw in &self.raw {
            store.store(raw.category, raw.kind.unwrap_or(raw.category), &raw.data)?;
        }

        debug!(records = self.len(), "loaded record snapshot");
        Ok(self.len())
    }
}
