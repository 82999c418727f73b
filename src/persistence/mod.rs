//! Persistence layer: versioned single-file snapshots.

pub mod format;
pub mod snapshot;

pub use snapshot::{SerializedRecord, StoreSnapshot};
