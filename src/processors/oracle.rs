//! Oracle event processor

use std::sync::Arc;
use tracing::debug;

use super::EventProcessor;
use crate::aggregates::{candles, TradeObservation};
use crate::chain::ChainReader;
use crate::core::IndexerResult;
use crate::database::StoreManager;
use crate::events::{EventEnvelope, EventPayload};
use crate::snapshots::{token, ProtocolDefaults, SnapshotContext};

/// Processor for price-oracle updates.
pub struct OracleProcessor {
    store: StoreManager,
    reader: Arc<dyn ChainReader>,
    defaults: ProtocolDefaults,
}

impl OracleProcessor {
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
}

#[async_trait::async_trait]
impl EventProcessor for OracleProcessor {
    async fn process(&self, envelope: &EventEnvelope) -> IndexerResult<()> {
        let EventPayload::OraclePrice { token: instrument, price } = &envelope.payload else {
            return Ok(());
        };
        debug!("oracle price for {}: {}", instrument, price);

        let observation = TradeObservation {
            trade_price: None,
            oracle_price: Some(*price),
            volume: None,
        };
        candles::observe_trade(&self.store, *instrument, envelope.timestamp, observation)?;

        // Registry entries re-read the oracle so their price field follows.
        let ctx = SnapshotContext::new(&self.store, self.reader.as_ref(), self.defaults);
        token::recompute_token(&ctx, *instrument, envelope.timestamp)?;
        token::recompute_collateral(&ctx, *instrument, envelope.timestamp)?;
        token::recompute_debt(&ctx, *instrument, envelope.timestamp)?;

        Ok(())
    }
}
