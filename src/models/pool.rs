//! Pool registry snapshot models

use crate::core::{Address, Wad};
use serde::{Deserialize, Serialize};

/// AMM pool registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub address: Address,
    pub token_0: Address,
    pub token_1: Address,
    pub reserve_0: Wad,
    pub reserve_1: Wad,
    pub tvl_usd: Wad,
    pub updated_at: i64,
}

/// Per-token liquidity of a pool, keyed by `(pool, token)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLiquidity {
    pub pool: Address,
    pub token: Address,
    pub liquidity: Wad,
    pub updated_at: i64,
}

/// Storage key for a `(pool, token)` liquidity row.
pub fn liquidity_key(pool: Address, token: Address) -> [u8; 40] {
    let mut key = [0u8; 40];
    key[..20].copy_from_slice(pool.as_bytes());
    key[20..].copy_from_slice(token.as_bytes());
    key
}
