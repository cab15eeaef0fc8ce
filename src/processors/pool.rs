//! Pool event processor

use std::sync::Arc;
use tracing::debug;

use super::EventProcessor;
use crate::aggregates::{candles, TradeObservation};
use crate::chain::ChainReader;
use crate::core::{Address, IndexerResult};
use crate::database::StoreManager;
use crate::events::{EventEnvelope, EventPayload};
use crate::snapshots::{pool, ProtocolDefaults, SnapshotContext};

/// Processor for swaps and liquidity changes.
pub struct PoolProcessor {
    store: StoreManager,
    reader: Arc<dyn ChainReader>,
    defaults: ProtocolDefaults,
}

impl PoolProcessor {
    pub fn new(
        store: StoreManager,
        reader: Arc<dyn ChainReader>,
        defaults: ProtocolDefaults,
    ) -> Self {
        Self {
            store,
            reader,
            defaults,
        }
    }

    fn ctx(&self) -> SnapshotContext<'_> {
        SnapshotContext::new(&self.store, self.reader.as_ref(), self.defaults)
    }

    /// Pair ordering for a pool first seen through a swap: an existing
    /// registry entry wins, otherwise the swap's direction is taken.
    fn pool_pair(
        &self,
        pool_addr: Address,
        token_in: Address,
        token_out: Address,
    ) -> IndexerResult<(Address, Address)> {
        Ok(match self.store.pool(pool_addr)? {
            Some(existing) => (existing.token_0, existing.token_1),
            None => (token_in, token_out),
        })
    }
}

#[async_trait::async_trait]
impl EventProcessor for PoolProcessor {
    async fn process(&self, envelope: &EventEnvelope) -> IndexerResult<()> {
        let ctx = self.ctx();
        let event_time = envelope.timestamp;

        match &envelope.payload {
            EventPayload::Swap {
                pool: pool_addr,
                token_in,
                token_out,
                amount_in,
                amount_out,
            } => {
                debug!("swap on {}: {} -> {}", pool_addr, token_in, token_out);
                let (token_0, token_1) = self.pool_pair(*pool_addr, *token_in, *token_out)?;
                pool::recompute_pool(&ctx, *pool_addr, token_0, token_1, event_time)?;

                // Trade candles exist for tokens priced against the
                // protocol numeraire; other pairs only move reserves.
                let numeraire = ctx.protocol_config()?.numeraire;
                let priced = if *token_in == numeraire {
                    Some((*token_out, amount_in.div_wad(*amount_out), *amount_in))
                } else if *token_out == numeraire {
                    Some((*token_in, amount_out.div_wad(*amount_in), *amount_out))
                } else {
                    None
                };
                if let Some((instrument, price, volume)) = priced {
                    let observation = TradeObservation {
                        trade_price: Some(price),
                        oracle_price: None,
                        volume: Some(volume),
                    };
                    candles::observe_trade(&self.store, instrument, event_time, observation)?;
                }
            }
            EventPayload::LiquidityChange {
                pool: pool_addr,
                token_0,
                token_1,
            } => {
                debug!("liquidity change on {}", pool_addr);
                pool::recompute_pool(&ctx, *pool_addr, *token_0, *token_1, event_time)?;
            }
            _ => {}
        }
        Ok(())
    }
}
