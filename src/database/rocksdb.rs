//! RocksDB storage backend with serde support

use rocksdb::{ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::KvStore;
use crate::config::RocksDbConfig;
use crate::core::{IndexerError, IndexerResult, StorageError};

/// Type alias for the RocksDB instance
pub type RocksDb = DBWithThreadMode<MultiThreaded>;

/// Column family names for different entity kinds
pub struct ColumnFamilies;

impl ColumnFamilies {
    pub const ROLLING_AVERAGES: &'static str = "rolling_averages";
    pub const ROLLING_BUCKETS: &'static str = "rolling_buckets";
    pub const CANDLE_SINGLETONS: &'static str = "candle_singletons";
    pub const CANDLES: &'static str = "candles";
    pub const DAILY_CHUNKS: &'static str = "daily_chunks";
    pub const PROTOCOL: &'static str = "protocol";
    pub const TOKENS: &'static str = "tokens";
    pub const COLLATERAL_TOKENS: &'static str = "collateral_tokens";
    pub const DEBT_TOKENS: &'static str = "debt_tokens";
    pub const POOLS: &'static str = "pools";
    pub const POOL_LIQUIDITY: &'static str = "pool_liquidity";
    pub const STAKING_POOLS: &'static str = "staking_pools";
    pub const STAKING_REWARDS: &'static str = "staking_rewards";

    /// Get all column family names
    pub fn all() -> Vec<&'static str> {
        vec![
            Self::ROLLING_AVERAGES,
            Self::ROLLING_BUCKETS,
            Self::CANDLE_SINGLETONS,
            Self::CANDLES,
            Self::DAILY_CHUNKS,
            Self::PROTOCOL,
            Self::TOKENS,
            Self::COLLATERAL_TOKENS,
            Self::DEBT_TOKENS,
            Self::POOLS,
            Self::POOL_LIQUIDITY,
            Self::STAKING_POOLS,
            Self::STAKING_REWARDS,
        ]
    }
}

/// RocksDB-backed entity store
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<RocksDb>,
}

impl RocksDbStore {
    /// Open (or create) the database at the configured path.
    pub fn open(config: &RocksDbConfig) -> IndexerResult<Self> {
        info!("Initializing RocksDB at path: {}", config.path.display());

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Performance tuning
        db_opts.set_max_open_files(config.max_open_files);
        db_opts.set_write_buffer_size(config.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.max_write_buffer_number);

        if config.enable_compression {
            db_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        }

        let cache = rocksdb::Cache::new_lru_cache(config.block_cache_size_mb * 1024 * 1024);
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_block_cache(&cache);
        db_opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ColumnFamilies::all()
            .into_iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
                ColumnFamilyDescriptor::new(name, cf_opts)
            })
            .collect();

        let db = RocksDb::open_cf_descriptors(&db_opts, &config.path, cf_descriptors)?;

        info!("RocksDB initialized successfully");

        Ok(Self { db: Arc::new(db) })
    }

    /// Open at an explicit path with default tuning; test helper.
    pub fn open_at(path: &Path) -> IndexerResult<Self> {
        let config = RocksDbConfig {
            path: path.to_path_buf(),
            ..RocksDbConfig::default()
        };
        Self::open(&config)
    }

    fn cf(&self, name: &str) -> IndexerResult<Arc<rocksdb::BoundColumnFamily<'_>>> {
        self.db.cf_handle(name).ok_or_else(|| {
            IndexerError::Storage(StorageError::ColumnFamilyMissing(name.to_string()))
        })
    }
}

impl KvStore for RocksDbStore {
    fn get_raw(&self, cf_name: &str, key: &[u8]) -> IndexerResult<Option<Vec<u8>>> {
        let cf = self.cf(cf_name)?;
        Ok(self.db.get_cf(&cf, key)?)
    }

    fn put_raw(&self, cf_name: &str, key: &[u8], value: &[u8]) -> IndexerResult<()> {
        let cf = self.cf(cf_name)?;
        Ok(self.db.put_cf(&cf, key, value)?)
    }

    fn delete_raw(&self, cf_name: &str, key: &[u8]) -> IndexerResult<()> {
        let cf = self.cf(cf_name)?;
        Ok(self.db.delete_cf(&cf, key)?)
    }

    fn prefix_scan(&self, cf_name: &str, prefix: &[u8]) -> IndexerResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let cf = self.cf(cf_name)?;
        let mut out = Vec::new();
        let iter = self.db.iterator_cf(
            &cf,
            rocksdb::IteratorMode::From(prefix, rocksdb::Direction::Forward),
        );
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }
}
