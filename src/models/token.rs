//! Token registry snapshot models
//!
//! Current-value projections keyed by token address. Created on first
//! sight of the instrument, then repeatedly overwritten in place by the
//! snapshot recompute; never deleted.

use crate::core::{Address, SeriesId, Wad};
use serde::{Deserialize, Serialize};

/// Base token registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    pub address: Address,
    /// Latest oracle price in USD.
    pub price_usd: Wad,
    pub total_supply: Wad,
    /// Rolling 30-day average of total supply.
    pub supply_series: SeriesId,
    pub supply_average: Wad,
    /// Event time of the last recompute.
    pub updated_at: i64,
}

/// Collateral token composite metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralTokenMeta {
    pub address: Address,
    /// Underlying asset the collateral wraps.
    pub underlying: Address,
    /// Current reserve balance held by the protocol.
    pub total_reserve: Wad,
    pub reserve_usd: Wad,
    pub price_usd: Wad,
    /// Rolling 30-day average of the reserve balance.
    pub reserve_series: SeriesId,
    pub reserve_average: Wad,
    pub updated_at: i64,
}

/// Debt token composite metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtTokenMeta {
    pub address: Address,
    pub underlying: Address,
    /// Outstanding minted amount.
    pub total_minted: Wad,
    pub minted_usd: Wad,
    pub price_usd: Wad,
    /// Rolling 30-day average of the outstanding debt.
    pub debt_series: SeriesId,
    pub debt_average: Wad,
    pub updated_at: i64,
}
