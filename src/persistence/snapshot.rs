//! Snapshot: save/load full store state to/from a single file.

use crate::config::{IndexConfig, StoreConfig};
use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use crate::flat_index::FlatIndex;
use crate::index::Index;
use crate::metadata::Metadata;
use crate::persistence::format;
use crate::storage::VectorStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Serializable representation of one stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

/// Serializable representation of the full store state.
///
/// Records are kept in insertion order so that tie-breaking survives a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub index: IndexConfig,
    pub records: Vec<SerializedRecord>,
}

impl StoreSnapshot {
    /// Capture the current state of a store.
    pub fn capture<I: Index>(store: &VectorStore<I>) -> Self {
        let config = store.config();
        let records = store
            .records()
            .map(|(id, vector, metadata)| SerializedRecord {
                id: id.to_string(),
                vector: vector.as_slice().to_vec(),
                metadata: metadata.clone(),
            })
            .collect();
        Self {
            dimension: config.dimension,
            metric: config.metric,
            index: config.index.clone(),
            records,
        }
    }

    /// Rebuild a store, rejecting snapshots whose contents break store invariants.
    pub fn restore(self) -> Result<VectorStore<FlatIndex>> {
        let config = StoreConfig {
            dimension: self.dimension,
            metric: self.metric,
            index: self.index,
        };
        let mut store = VectorStore::with_config(config)
            .map_err(|e| VectorDbError::corrupt(e.to_string()))?;

        for record in self.records {
            let id = record.id.clone();
            store
                .add(record.id, record.vector, record.metadata)
                .map_err(|e| VectorDbError::corrupt(format!("record {:?}: {}", id, e)))?;
        }
        Ok(store)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(format::encode(&format::to_bincode(self)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let payload = format::decode(bytes)?;
        format::from_bincode(payload).map_err(|e| VectorDbError::corrupt(e.to_string()))
    }
}

/// Write `bytes` to `path` via a temporary file in the same directory that is
/// fsynced and then renamed over the target. The target is either the old
/// file or the complete new one, never a partial write.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl<I: Index> VectorStore<I> {
    /// Save the whole store to `path`, replacing any existing file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = StoreSnapshot::capture(self).to_bytes()?;
        write_atomic(path, &bytes)?;
        info!(path = %path.display(), records = self.len(), bytes = bytes.len(), "saved store");
        Ok(())
    }
}

impl VectorStore<FlatIndex> {
    /// Load a store previously written by [`VectorStore::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let store = StoreSnapshot::from_bytes(&bytes)
            .and_then(StoreSnapshot::restore)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "rejected store file");
                e
            })?;
        info!(path = %path.display(), records = store.len(), "loaded store");
        Ok(store)
    }
}
