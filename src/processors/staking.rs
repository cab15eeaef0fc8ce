//! Staking event processor

use std::sync::Arc;
use tracing::debug;

use super::EventProcessor;
use crate::chain::ChainReader;
use crate::core::IndexerResult;
use crate::database::StoreManager;
use crate::events::{EventEnvelope, EventPayload};
use crate::snapshots::{staking, ProtocolDefaults, SnapshotContext};

/// Processor for staking deposits, withdrawals and reward notifications.
pub struct StakingProcessor {
    store: StoreManager,
    reader: Arc<dyn ChainReader>,
    defaults: ProtocolDefaults,
}

impl StakingProcessor {
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
}

#[async_trait::async_trait]
impl EventProcessor for StakingProcessor {
    async fn process(&self, envelope: &EventEnvelope) -> IndexerResult<()> {
        let ctx = self.ctx();
        let event_time = envelope.timestamp;

        match &envelope.payload {
            EventPayload::StakingDeposit {
                pool,
                staking_token,
                amount,
            } => {
                debug!("staking deposit of {} into {}", amount, pool);
                staking::recompute_staking_pool(
                    &ctx,
                    *pool,
                    *staking_token,
                    Some(*amount),
                    event_time,
                )?;
            }
            EventPayload::StakingWithdraw {
                pool,
                staking_token,
                amount,
            } => {
                debug!("staking withdrawal of {} from {}", amount, pool);
                staking::recompute_staking_pool(&ctx, *pool, *staking_token, None, event_time)?;
            }
            EventPayload::RewardNotified {
                pool,
                reward_token,
                amount,
            } => {
                debug!("reward of {} notified on {}", amount, pool);
                staking::recompute_staking_reward(&ctx, *pool, *reward_token, event_time)?;
                // Refresh pool metrics when the pool is already known.
                if let Some(prior) = self.store.staking_pool(*pool)? {
                    staking::recompute_staking_pool(
                        &ctx,
                        *pool,
                        prior.staking_token,
                        None,
                        event_time,
                    )?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
