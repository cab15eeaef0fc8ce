//! Rolling-average series models

use crate::core::{SeriesId, Wad};
use serde::{Deserialize, Serialize};

/// Buckets per rolling window: 30 days of hourly samples.
pub const WINDOW: u64 = 720;

/// Width of one bucket in seconds.
pub const BUCKET_SPAN_SECS: i64 = 3_600;

/// Head record of a rolling-average series.
///
/// `value` is the truncated arithmetic mean of the last
/// `min(index, WINDOW)` bucket values; `index` counts buckets ever
/// appended (1-based) and names the current mutable bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingAverage {
    pub series: SeriesId,
    pub value: Wad,
    pub index: u64,
}

/// One time bucket of a rolling series.
///
/// Immutable once a later bucket exists; the highest-index bucket is
/// overwritten in place while its hour is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingBucket {
    pub series: SeriesId,
    pub index: u64,
    /// Nominal start time of the bucket's span.
    pub timestamp: i64,
    /// Last observed value during the span, or the carried-forward value
    /// for gap-filled buckets.
    pub value: Wad,
}
