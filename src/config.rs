//! Configuration management for the Meridian indexer

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::core::Address;
use crate::snapshots::ProtocolDefaults;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct IndexerConfig {
    pub storage: StorageConfig,
    pub chain: ChainConfig,
    pub intake: IntakeConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StorageConfig {
    pub rocksdb: RocksDbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RocksDbConfig {
    pub path: PathBuf,
    pub enable_compression: bool,
    #[validate(range(min = 100, max = 10000))]
    pub max_open_files: i32,
    #[validate(range(min = 16, max = 2048))]
    pub write_buffer_size_mb: usize,
    #[validate(range(min = 2, max = 16))]
    pub max_write_buffer_number: i32,
    #[validate(range(min = 32, max = 4096))]
    pub block_cache_size_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChainConfig {
    #[validate(url)]
    pub rpc_endpoint: String,
    pub price_oracle: Address,
    pub pool_registry: Address,
    pub staking_registry: Address,
    pub token_manager: Address,
    pub numeraire: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IntakeConfig {
    /// JSONL file of decoded events, in chain order.
    pub events_path: PathBuf,
    /// Progress log cadence, in events.
    #[validate(range(min = 1, max = 1000000))]
    pub log_every: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub structured_logging: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            rocksdb: RocksDbConfig::default(),
        }
    }
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/rocksdb".into(),
            enable_compression: true,
            max_open_files: 1000,
            write_buffer_size_mb: 256,
            max_write_buffer_number: 4,
            block_cache_size_mb: 512,
        }
    }
}

/// Placeholder registry address used by the default config.
fn default_addr(tail: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = tail;
    Address(bytes)
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: "http://localhost:8545".to_string(),
            price_oracle: default_addr(0x01),
            pool_registry: default_addr(0x02),
            staking_registry: default_addr(0x03),
            token_manager: default_addr(0x04),
            numeraire: default_addr(0x05),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            events_path: "./data/events.jsonl".into(),
            log_every: 1000,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            structured_logging: false,
        }
    }
}

impl IndexerConfig {
    /// Load configuration from file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Ensure required directories exist
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.storage.rocksdb.path)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chain.rpc_endpoint.is_empty() {
            return Err(anyhow::anyhow!("RPC endpoint cannot be empty"));
        }
        if self.chain.price_oracle.is_zero() {
            return Err(anyhow::anyhow!("Price oracle address cannot be zero"));
        }
        Ok(())
    }

    /// Protocol addresses used to seed the lazy singleton.
    pub fn protocol_defaults(&self) -> ProtocolDefaults {
        ProtocolDefaults {
            price_oracle: self.chain.price_oracle,
            pool_registry: self.chain.pool_registry,
            staking_registry: self.chain.staking_registry,
            token_manager: self.chain.token_manager,
            numeraire: self.chain.numeraire,
        }
    }
}
