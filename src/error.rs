//! Error types for the vector store

use thiserror::Error;

/// Result type alias for vector store operations
pub type Result<T> = std::result::Result<T, VectorDbError>;

/// Error types that can occur in vector store operations
#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate id: {id}")]
    DuplicateId { id: String },

    #[error("Key not found: {id}")]
    KeyNotFound { id: String },

    #[error("Invalid k: {k} (must be positive)")]
    InvalidK { k: usize },

    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("Degenerate vector: {reason}")]
    DegenerateVector { reason: String },

    #[error("Batch length mismatch: {ids} ids, {vectors} vectors, {metadatas} metadata entries")]
    BatchLengthMismatch {
        ids: usize,
        vectors: usize,
        metadatas: usize,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corrupt store: {reason}")]
    CorruptStore { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VectorDbError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        VectorDbError::CorruptStore {
            reason: reason.into(),
        }
    }
}
