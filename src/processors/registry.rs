//! Processor registry for routing events to appropriate handlers

use std::sync::Arc;
use tracing::warn;

use super::{
    EventProcessor, OracleProcessor, PoolProcessor, StakingProcessor, TokenProcessor,
};
use crate::chain::ChainReader;
use crate::core::{IndexerError, IndexerResult};
use crate::database::StoreManager;
use crate::events::{EventEnvelope, EventPayload};
use crate::snapshots::ProtocolDefaults;

/// Registry for all processors. Applies events strictly sequentially and
/// rejects time regressions before any state is touched.
pub struct ProcessorRegistry {
    token_processor: TokenProcessor,
    pool_processor: PoolProcessor,
    staking_processor: StakingProcessor,
    oracle_processor: OracleProcessor,
    last_event_time: Option<i64>,
}

impl ProcessorRegistry {
    /// Create a new processor registry
    pub fn new(
        store: StoreManager,
        reader: Arc<dyn ChainReader>,
        defaults: ProtocolDefaults,
    ) -> Self {
        Self {
            token_processor: TokenProcessor::new(store.clone(), reader.clone(), defaults),
            pool_processor: PoolProcessor::new(store.clone(), reader.clone(), defaults),
            staking_processor: StakingProcessor::new(store.clone(), reader.clone(), defaults),
            oracle_processor: OracleProcessor::new(store, reader, defaults),
            last_event_time: None,
        }
    }

    /// Route one event to its processor.
    pub async fn process_event(&mut self, envelope: &EventEnvelope) -> IndexerResult<()> {
        if let Some(prior) = self.last_event_time {
            if envelope.timestamp < prior {
                warn!(
                    "event time regression at block {}: {} < {}",
                    envelope.block_number, envelope.timestamp, prior
                );
                return Err(IndexerError::TimeRegression {
                    prior,
                    observed: envelope.timestamp,
                });
            }
        }

        match &envelope.payload {
            EventPayload::Transfer { .. }
            | EventPayload::ReserveWithdraw { .. }
            | EventPayload::CollateralRegistered { .. }
            | EventPayload::DebtRegistered { .. } => {
                self.token_processor.process(envelope).await?;
            }
            EventPayload::Swap { .. } | EventPayload::LiquidityChange { .. } => {
                self.pool_processor.process(envelope).await?;
            }
            EventPayload::OraclePrice { .. } => {
                self.oracle_processor.process(envelope).await?;
            }
            EventPayload::StakingDeposit { .. }
            | EventPayload::StakingWithdraw { .. }
            | EventPayload::RewardNotified { .. } => {
                self.staking_processor.process(envelope).await?;
            }
        }

        self.last_event_time = Some(envelope.timestamp);
        Ok(())
    }
}
