//! Staking registry snapshot models

use crate::core::{Address, SeriesId, Wad};
use serde::{Deserialize, Serialize};

/// Staking pool registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingPool {
    pub address: Address,
    pub staking_token: Address,
    pub total_staked: Wad,
    /// Cumulative deposit volume since first sight.
    pub deposit_volume_total: Wad,
    /// Rolling 30-day average of the cumulative deposit volume.
    pub deposit_series: SeriesId,
    pub deposit_average: Wad,
    pub updated_at: i64,
}

/// Per-reward-token metrics of a staking pool, keyed by
/// `(pool, reward_token)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingPoolReward {
    pub pool: Address,
    pub reward_token: Address,
    pub reward_rate: Wad,
    pub period_finish: i64,
    pub updated_at: i64,
}

/// Storage key for a `(pool, reward_token)` reward row.
pub fn reward_key(pool: Address, reward_token: Address) -> [u8; 40] {
    let mut key = [0u8; 40];
    key[..20].copy_from_slice(pool.as_bytes());
    key[20..].copy_from_slice(reward_token.as_bytes());
    key
}
