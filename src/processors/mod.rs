//! Event processors for the Meridian protocol
//!
//! Thin routing glue: each processor owns one contract domain and decides
//! which snapshot recomputes and aggregate observations an event
//! triggers. All heavy lifting lives in `aggregates` and `snapshots`.

mod oracle;
mod pool;
mod registry;
mod staking;
mod token;

pub use oracle::OracleProcessor;
pub use pool::PoolProcessor;
pub use registry::ProcessorRegistry;
pub use staking::StakingProcessor;
pub use token::TokenProcessor;

use crate::core::IndexerResult;
use crate::events::EventEnvelope;

/// Trait for processing decoded events
#[async_trait::async_trait]
pub trait EventProcessor: Send + Sync {
    /// Apply one event's effects to the store.
    async fn process(&self, envelope: &EventEnvelope) -> IndexerResult<()>;
}
