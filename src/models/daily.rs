//! Daily coarse history models

use crate::core::{DailySeries, Wad};
use serde::{Deserialize, Serialize};

/// Width of a daily chunk in seconds.
pub const DAY_SPAN_SECS: i64 = 86_400;

/// One chunk of a protocol-level daily series.
///
/// Only the most recent chunk of a series is mutable, and only upward:
/// within the chunk's day a smaller value is a no-op (the chunk tracks the
/// running maximum, not the last value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChunk {
    pub series: DailySeries,
    pub index: u64,
    /// Start time of the chunk's day.
    pub timestamp: i64,
    /// Chunk width in seconds; fixed at [`DAY_SPAN_SECS`].
    pub size: i64,
    pub value: Wad,
}
