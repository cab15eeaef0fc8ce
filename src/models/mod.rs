//! Data models for indexed Meridian Protocol state

pub mod candle;
pub mod daily;
pub mod pool;
pub mod protocol;
pub mod rolling;
pub mod staking;
pub mod token;

pub use candle::{Candle, CandleSingleton, Resolution};
pub use daily::{DailyChunk, DAY_SPAN_SECS};
pub use pool::{Pool, PoolLiquidity};
pub use protocol::ProtocolConfig;
pub use rolling::{RollingAverage, RollingBucket, BUCKET_SPAN_SECS, WINDOW};
pub use staking::{StakingPool, StakingPoolReward};
pub use token::{CollateralTokenMeta, DebtTokenMeta, TokenMeta};
