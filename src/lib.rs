//! # vecstore
//!
//! An in-memory vector store with exact similarity search.
//!
//! This library provides:
//! - Vector storage with scalar metadata
//! - Similarity and distance metrics (Cosine, Euclidean), normalization, content hashing
//! - Brute-force k-NN search with metadata filters applied before ranking
//! - Atomic, checksummed snapshot persistence
//!
//! ## Example
//!
//! ```rust
//! use vecstore::{DistanceMetric, Filter, Metadata, VectorStore};
//!
//! let mut store = VectorStore::new(2, DistanceMetric::Cosine).unwrap();
//!
//! store.add("a", vec![1.0, 0.0], Metadata::new().with("lang", "en")).unwrap();
//! store.add("b", vec![0.0, 1.0], Metadata::new().with("lang", "en")).unwrap();
//! store.add("c", vec![0.9, 0.1], Metadata::new().with("lang", "fr")).unwrap();
//!
//! let results = store.search(&[1.0, 0.0], 2, None).unwrap();
//! assert_eq!(results[0].id, "a");
//! assert_eq!(results[1].id, "c");
//!
//! let english = Filter::new().equals("lang", "en");
//! let results = store.search(&[1.0, 0.0], 2, Some(&english)).unwrap();
//! assert_eq!(results[1].id, "b");
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod flat_index;
pub mod hash;
pub mod index;
pub mod metadata;
pub mod persistence;
pub mod query;
pub mod storage;
pub mod vector;

pub use config::{IndexConfig, IndexType, StoreConfig};
pub use distance::{cosine_similarity, dot_product, euclidean_distance, DistanceMetric, ScoreOrder};
pub use error::{Result, VectorDbError};
pub use flat_index::FlatIndex;
pub use hash::{content_hash, ContentHash, HASH_PRECISION};
pub use index::Index;
pub use metadata::{Metadata, MetadataValue};
pub use query::{Condition, Filter, Query};
pub use storage::{Record, SearchResult, VectorStore};
pub use vector::{batch_normalize, normalize, Vector};
