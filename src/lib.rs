//! Meridian Protocol Indexer Library
//!
//! Sequential chain-event indexer maintaining derived aggregate state for
//! the Meridian protocol: rolling 30-day windowed averages, multi-resolution
//! OHLCV candles, daily coarse history ledgers, and point-in-time registry
//! snapshots, all persisted in RocksDB.

pub mod aggregates;
pub mod chain;
pub mod config;
pub mod core;
pub mod database;
pub mod events;
pub mod models;
pub mod processors;
pub mod snapshots;

// Re-export commonly used types
pub use crate::core::{Address, IndexerError, IndexerResult, Wad};
pub use config::IndexerConfig;
pub use database::{MemoryStore, RocksDbStore, StoreManager};
pub use models::*;

#[cfg(test)]
mod tests {
    use crate::database::{ColumnFamilies, KvStore, RocksDbStore};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_rocksdb_basic() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let db = RocksDbStore::open_at(temp_dir.path())?;

        db.put_raw(ColumnFamilies::TOKENS, b"test", b"value")?;
        let result = db.get_raw(ColumnFamilies::TOKENS, b"test")?;

        assert_eq!(result, Some(b"value".to_vec()));

        Ok(())
    }
}
