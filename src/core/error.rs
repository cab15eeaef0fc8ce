//! Centralized error types for the Meridian indexer

use thiserror::Error;

/// Main indexer error type
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record that must already exist by invariant was not found. This
    /// signals an out-of-order or skipped prior event; the triggering event
    /// is aborted for upstream retry.
    #[error("Missing prerequisite {kind}: {key}")]
    MissingEntity { kind: &'static str, key: String },

    /// Event time moved backwards for a serialized stream. Unmodeled input;
    /// processing stops.
    #[error("Event time regression: prior {prior}, observed {observed}")]
    TimeRegression { prior: i64, observed: i64 },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("RocksDB error: {0}")]
    RocksDB(String),

    #[error("Column family '{0}' not found")]
    ColumnFamilyMissing(String),

    #[error("Codec error: {0}")]
    Codec(String),
}

/// Result type alias for indexer operations
pub type IndexerResult<T> = Result<T, IndexerError>;

/// Helper to convert rocksdb errors
impl From<rocksdb::Error> for IndexerError {
    fn from(err: rocksdb::Error) -> Self {
        IndexerError::Storage(StorageError::RocksDB(err.to_string()))
    }
}

/// Helper to convert serialization errors
impl From<bincode::Error> for IndexerError {
    fn from(err: bincode::Error) -> Self {
        IndexerError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for IndexerError {
    fn from(err: serde_json::Error) -> Self {
        IndexerError::Serialization(err.to_string())
    }
}
