//! Token event processor

use std::sync::Arc;
use tracing::debug;

use super::EventProcessor;
use crate::chain::ChainReader;
use crate::core::{IndexerError, IndexerResult};
use crate::database::StoreManager;
use crate::events::{EventEnvelope, EventPayload};
use crate::snapshots::{token, ProtocolDefaults, SnapshotContext};

/// Processor for transfers, reserve withdrawals and registry additions.
pub struct TokenProcessor {
    store: StoreManager,
    reader: Arc<dyn ChainReader>,
    defaults: ProtocolDefaults,
}

impl TokenProcessor {
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
impl EventProcessor for TokenProcessor {
    async fn process(&self, envelope: &EventEnvelope) -> IndexerResult<()> {
        let ctx = self.ctx();
        let event_time = envelope.timestamp;

        match &envelope.payload {
            EventPayload::Transfer { token, .. } => {
                debug!("transfer on {}", token);
                token::recompute_token(&ctx, *token, event_time)?;
                // Composite metrics only exist for registered instruments.
                token::recompute_collateral(&ctx, *token, event_time)?;
                token::recompute_debt(&ctx, *token, event_time)?;
            }
            EventPayload::ReserveWithdraw { token, amount } => {
                debug!("reserve withdrawal of {} from {}", amount, token);
                token::recompute_collateral(&ctx, *token, event_time)?.ok_or(
                    IndexerError::MissingEntity {
                        kind: "collateral_token",
                        key: token.to_string(),
                    },
                )?;
            }
            EventPayload::CollateralRegistered { token, underlying } => {
                token::register_collateral(&ctx, *token, *underlying, event_time)?;
            }
            EventPayload::DebtRegistered { token, underlying } => {
                token::register_debt(&ctx, *token, *underlying, event_time)?;
            }
            _ => {}
        }
        Ok(())
    }
}
