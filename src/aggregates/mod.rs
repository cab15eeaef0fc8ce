//! Incremental aggregation engines
//!
//! The core of the indexer: pure state transitions over the entity store,
//! clocked entirely by event time. Each engine loads the prior persisted
//! state, folds in one observation, and persists the result, so replaying
//! the same event against the same state is a no-op.

pub mod candles;
pub mod daily;
pub mod rolling;

pub use candles::{observe_trade, TradeObservation};
pub use daily::observe_daily;
pub use rolling::{observe, observe_seeded};
