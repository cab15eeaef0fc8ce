//! Protocol singleton config

use crate::core::{Address, DailySeries};
use serde::{Deserialize, Serialize};

/// Singleton registry of canonical contract addresses plus the daily
/// history counters.
///
/// Created lazily on first reference with the configured default
/// addresses; subsequently only ever updated field-by-field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub price_oracle: Address,
    pub pool_registry: Address,
    pub staking_registry: Address,
    pub token_manager: Address,
    /// Stablecoin the trade-price candle track is denominated in.
    pub numeraire: Address,

    /// Index of the newest reserve-USD daily chunk.
    pub reserve_history_index: u64,
    /// Index of the newest minted-USD daily chunk.
    pub minted_history_index: u64,
    /// Index of the newest TVL-USD daily chunk.
    pub tvl_history_index: u64,
}

impl ProtocolConfig {
    pub fn with_defaults(
        price_oracle: Address,
        pool_registry: Address,
        staking_registry: Address,
        token_manager: Address,
        numeraire: Address,
    ) -> Self {
        Self {
            price_oracle,
            pool_registry,
            staking_registry,
            token_manager,
            numeraire,
            reserve_history_index: 0,
            minted_history_index: 0,
            tvl_history_index: 0,
        }
    }

    /// Current chunk index for a daily series.
    pub fn history_index(&self, series: DailySeries) -> u64 {
        match series {
            DailySeries::ReserveUsd => self.reserve_history_index,
            DailySeries::MintedUsd => self.minted_history_index,
            DailySeries::TvlUsd => self.tvl_history_index,
        }
    }

    /// Advance the counter for a daily series to `index`.
    pub fn set_history_index(&mut self, series: DailySeries, index: u64) {
        match series {
            DailySeries::ReserveUsd => self.reserve_history_index = index,
            DailySeries::MintedUsd => self.minted_history_index = index,
            DailySeries::TvlUsd => self.tvl_history_index = index,
        }
    }
}
