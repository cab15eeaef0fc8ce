//! Entity store layer
//!
//! A thin key-value contract ([`KvStore`]) with two backends (RocksDB for
//! production, in-memory for tests) and a typed [`StoreManager`] that owns
//! key encoding and bincode framing for every entity kind.

pub mod memory;
pub mod rocksdb;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::core::{Address, DailySeries, IndexerError, IndexerResult, SeriesId};
use crate::models::{
    candle, pool, staking, Candle, CandleSingleton, CollateralTokenMeta, DailyChunk, DebtTokenMeta,
    Pool, PoolLiquidity, ProtocolConfig, Resolution, RollingAverage, RollingBucket, StakingPool,
    StakingPoolReward, TokenMeta,
};

pub use memory::MemoryStore;
pub use rocksdb::{ColumnFamilies, RocksDbStore};

/// Minimal key-value contract every backend satisfies.
///
/// The event's effects are applied as a sequence of puts; atomicity across
/// them is provided by at-least-once replay with idempotent recompute, not
/// by transactions.
pub trait KvStore: Send + Sync {
    fn get_raw(&self, cf: &str, key: &[u8]) -> IndexerResult<Option<Vec<u8>>>;
    fn put_raw(&self, cf: &str, key: &[u8], value: &[u8]) -> IndexerResult<()>;
    fn delete_raw(&self, cf: &str, key: &[u8]) -> IndexerResult<()>;
    fn prefix_scan(&self, cf: &str, prefix: &[u8]) -> IndexerResult<Vec<(Vec<u8>, Vec<u8>)>>;
}

/// Key under which the protocol singleton lives.
const PROTOCOL_KEY: &[u8] = b"protocol";

/// Typed access to every entity kind over any [`KvStore`] backend.
#[derive(Clone)]
pub struct StoreManager {
    store: Arc<dyn KvStore>,
}

impl StoreManager {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn get<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> IndexerResult<Option<T>> {
        match self.store.get_raw(cf, key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> IndexerResult<()> {
        let bytes = bincode::serialize(value)?;
        self.store.put_raw(cf, key, &bytes)
    }

    fn scan_all<T: DeserializeOwned>(&self, cf: &str) -> IndexerResult<Vec<T>> {
        self.store
            .prefix_scan(cf, &[])?
            .into_iter()
            .map(|(_, bytes)| bincode::deserialize(&bytes).map_err(IndexerError::from))
            .collect()
    }

    // ---- rolling averages -------------------------------------------------

    pub fn rolling_average(&self, series: SeriesId) -> IndexerResult<Option<RollingAverage>> {
        self.get(ColumnFamilies::ROLLING_AVERAGES, &series.encode())
    }

    pub fn put_rolling_average(&self, average: &RollingAverage) -> IndexerResult<()> {
        self.put(
            ColumnFamilies::ROLLING_AVERAGES,
            &average.series.encode(),
            average,
        )
    }

    pub fn rolling_bucket(
        &self,
        series: SeriesId,
        index: u64,
    ) -> IndexerResult<Option<RollingBucket>> {
        self.get(ColumnFamilies::ROLLING_BUCKETS, &series.bucket_key(index))
    }

    /// Bucket that must exist by invariant; absence is an out-of-order or
    /// skipped prior event.
    pub fn require_rolling_bucket(
        &self,
        series: SeriesId,
        index: u64,
    ) -> IndexerResult<RollingBucket> {
        self.rolling_bucket(series, index)?
            .ok_or(IndexerError::MissingEntity {
                kind: "rolling_bucket",
                key: format!("{}#{}", series, index),
            })
    }

    pub fn put_rolling_bucket(&self, bucket: &RollingBucket) -> IndexerResult<()> {
        self.put(
            ColumnFamilies::ROLLING_BUCKETS,
            &bucket.series.bucket_key(bucket.index),
            bucket,
        )
    }

    // ---- candles ----------------------------------------------------------

    pub fn candle_singleton(
        &self,
        instrument: Address,
        resolution: Resolution,
    ) -> IndexerResult<Option<CandleSingleton>> {
        self.get(
            ColumnFamilies::CANDLE_SINGLETONS,
            &candle::singleton_key(instrument, resolution),
        )
    }

    pub fn put_candle_singleton(&self, singleton: &CandleSingleton) -> IndexerResult<()> {
        self.put(
            ColumnFamilies::CANDLE_SINGLETONS,
            &candle::singleton_key(singleton.instrument, singleton.resolution),
            singleton,
        )
    }

    /// Append a closed candle row. History is append-only; rows are never
    /// mutated after creation.
    pub fn push_candle(&self, row: &Candle) -> IndexerResult<()> {
        self.put(
            ColumnFamilies::CANDLES,
            &candle::history_key(row.instrument, row.resolution, row.timestamp),
            row,
        )
    }

    /// Closed candles of `(instrument, resolution)` in timestamp order.
    pub fn candles(
        &self,
        instrument: Address,
        resolution: Resolution,
    ) -> IndexerResult<Vec<Candle>> {
        let rows = self.store.prefix_scan(
            ColumnFamilies::CANDLES,
            &candle::history_prefix(instrument, resolution),
        )?;
        rows.into_iter()
            .map(|(_, bytes)| bincode::deserialize(&bytes).map_err(IndexerError::from))
            .collect()
    }

    // ---- daily chunks -----------------------------------------------------

    pub fn daily_chunk(&self, series: DailySeries, index: u64) -> IndexerResult<Option<DailyChunk>> {
        self.get(ColumnFamilies::DAILY_CHUNKS, &series.chunk_key(index))
    }

    pub fn put_daily_chunk(&self, chunk: &DailyChunk) -> IndexerResult<()> {
        self.put(
            ColumnFamilies::DAILY_CHUNKS,
            &chunk.series.chunk_key(chunk.index),
            chunk,
        )
    }

    // ---- protocol singleton -----------------------------------------------

    pub fn protocol_config(&self) -> IndexerResult<Option<ProtocolConfig>> {
        self.get(ColumnFamilies::PROTOCOL, PROTOCOL_KEY)
    }

    pub fn put_protocol_config(&self, config: &ProtocolConfig) -> IndexerResult<()> {
        self.put(ColumnFamilies::PROTOCOL, PROTOCOL_KEY, config)
    }

    // ---- registries -------------------------------------------------------

    pub fn token(&self, address: Address) -> IndexerResult<Option<TokenMeta>> {
        self.get(ColumnFamilies::TOKENS, address.as_bytes())
    }

    pub fn put_token(&self, token: &TokenMeta) -> IndexerResult<()> {
        self.put(ColumnFamilies::TOKENS, token.address.as_bytes(), token)
    }

    pub fn collateral_token(&self, address: Address) -> IndexerResult<Option<CollateralTokenMeta>> {
        self.get(ColumnFamilies::COLLATERAL_TOKENS, address.as_bytes())
    }

    pub fn put_collateral_token(&self, token: &CollateralTokenMeta) -> IndexerResult<()> {
        self.put(
            ColumnFamilies::COLLATERAL_TOKENS,
            token.address.as_bytes(),
            token,
        )
    }

    /// Every collateral token in the registry.
    pub fn collateral_tokens(&self) -> IndexerResult<Vec<CollateralTokenMeta>> {
        self.scan_all(ColumnFamilies::COLLATERAL_TOKENS)
    }

    pub fn debt_token(&self, address: Address) -> IndexerResult<Option<DebtTokenMeta>> {
        self.get(ColumnFamilies::DEBT_TOKENS, address.as_bytes())
    }

    pub fn put_debt_token(&self, token: &DebtTokenMeta) -> IndexerResult<()> {
        self.put(ColumnFamilies::DEBT_TOKENS, token.address.as_bytes(), token)
    }

    /// Every debt token in the registry.
    pub fn debt_tokens(&self) -> IndexerResult<Vec<DebtTokenMeta>> {
        self.scan_all(ColumnFamilies::DEBT_TOKENS)
    }

    pub fn pool(&self, address: Address) -> IndexerResult<Option<Pool>> {
        self.get(ColumnFamilies::POOLS, address.as_bytes())
    }

    pub fn put_pool(&self, entry: &Pool) -> IndexerResult<()> {
        self.put(ColumnFamilies::POOLS, entry.address.as_bytes(), entry)
    }

    /// Every pool in the registry.
    pub fn pools(&self) -> IndexerResult<Vec<Pool>> {
        self.scan_all(ColumnFamilies::POOLS)
    }

    pub fn pool_liquidity(
        &self,
        pool_addr: Address,
        token: Address,
    ) -> IndexerResult<Option<PoolLiquidity>> {
        self.get(
            ColumnFamilies::POOL_LIQUIDITY,
            &pool::liquidity_key(pool_addr, token),
        )
    }

    pub fn put_pool_liquidity(&self, row: &PoolLiquidity) -> IndexerResult<()> {
        self.put(
            ColumnFamilies::POOL_LIQUIDITY,
            &pool::liquidity_key(row.pool, row.token),
            row,
        )
    }

    pub fn staking_pool(&self, address: Address) -> IndexerResult<Option<StakingPool>> {
        self.get(ColumnFamilies::STAKING_POOLS, address.as_bytes())
    }

    pub fn put_staking_pool(&self, entry: &StakingPool) -> IndexerResult<()> {
        self.put(ColumnFamilies::STAKING_POOLS, entry.address.as_bytes(), entry)
    }

    pub fn staking_reward(
        &self,
        pool_addr: Address,
        reward_token: Address,
    ) -> IndexerResult<Option<StakingPoolReward>> {
        self.get(
            ColumnFamilies::STAKING_REWARDS,
            &staking::reward_key(pool_addr, reward_token),
        )
    }

    pub fn put_staking_reward(&self, row: &StakingPoolReward) -> IndexerResult<()> {
        self.put(
            ColumnFamilies::STAKING_REWARDS,
            &staking::reward_key(row.pool, row.reward_token),
            row,
        )
    }
}
