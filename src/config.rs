//! Store construction parameters

use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested index backend. Only recorded; search is always brute force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    #[default]
    Flat,
    Hnsw,
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexType::Flat => f.write_str("flat"),
            IndexType::Hnsw => f.write_str("hnsw"),
        }
    }
}

impl FromStr for IndexType {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(IndexType::Flat),
            "hnsw" => Ok(IndexType::Hnsw),
            other => Err(VectorDbError::InvalidConfig {
                reason: format!("unknown index type: {}", other),
            }),
        }
    }
}

/// Hyperparameters reserved for an approximate index backend.
///
/// They are validated, stored, and persisted with the store, but have no
/// effect on search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub index_type: IndexType,
    /// Max connections per graph node.
    pub m: usize,
    /// Candidate list size during construction.
    pub ef_construction: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_type: IndexType::Flat,
            m: 16,
            ef_construction: 200,
        }
    }
}

/// Configuration for a [`VectorStore`](crate::storage::VectorStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Fixed vector dimension. Immutable after creation.
    pub dimension: usize,
    pub metric: DistanceMetric,
    #[serde(default)]
    pub index: IndexConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dimension: 768,
            metric: DistanceMetric::Cosine,
            index: IndexConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn new(dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            dimension,
            metric,
            index: IndexConfig::default(),
        }
    }

    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(VectorDbError::InvalidConfig {
                reason: "dimension must be positive".to_string(),
            });
        }
        if self.index.m == 0 || self.index.ef_construction == 0 {
            return Err(VectorDbError::InvalidConfig {
                reason: "m and ef_construction must be positive".to_string(),
            });
        }
        Ok(())
    }
}
