//! Chunked rolling average engine
//!
//! Maintains, per series, a bounded run of hour-wide buckets and a
//! continuously updated mean over the last [`WINDOW`] of them. Sparse
//! event cadences are handled by lazily appending carry-forward buckets
//! for every skipped hour, so cost is O(gap), never O(history).
//!
//! The mean is updated with divide-each-term-then-combine arithmetic.
//! That order bounds intermediate magnitudes but truncates each term
//! independently, which accrues a small, bounded drift over long windows.
//! The drift is part of the series' observable contract and must survive
//! replays unchanged, so the formulas below are not algebraically
//! simplified.

use tracing::trace;

use crate::core::{IndexerResult, SeriesId, Wad};
use crate::database::StoreManager;
use crate::models::{RollingAverage, RollingBucket, BUCKET_SPAN_SECS, WINDOW};

/// Fold one observation into a series, seeding a new series with the
/// observed value itself.
///
/// Returns the series' bucket index and windowed mean after the update.
pub fn observe(
    store: &StoreManager,
    series: SeriesId,
    event_time: i64,
    new_value: Wad,
) -> IndexerResult<(u64, Wad)> {
    observe_seeded(store, series, event_time, new_value, new_value)
}

/// Fold one observation into a series, using `baseline` for bucket #1 if
/// the series does not exist yet. The first call only establishes the
/// series; `new_value` starts taking effect from the second call on.
pub fn observe_seeded(
    store: &StoreManager,
    series: SeriesId,
    event_time: i64,
    new_value: Wad,
    baseline: Wad,
) -> IndexerResult<(u64, Wad)> {
    let Some(mut average) = store.rolling_average(series)? else {
        let bucket = RollingBucket {
            series,
            index: 1,
            timestamp: event_time,
            value: baseline,
        };
        let average = RollingAverage {
            series,
            value: baseline,
            index: 1,
        };
        store.put_rolling_bucket(&bucket)?;
        store.put_rolling_average(&average)?;
        trace!(%series, "rolling series created");
        return Ok((1, average.value));
    };

    let mut bucket = store.require_rolling_bucket(series, average.index)?;

    // Backfill: every skipped hour gets a bucket holding the value that
    // was current over that span.
    while event_time - bucket.timestamp >= 2 * BUCKET_SPAN_SECS {
        bucket = append_bucket(
            store,
            &mut average,
            bucket.timestamp + BUCKET_SPAN_SECS,
            bucket.value,
        )?;
    }

    if event_time - bucket.timestamp >= BUCKET_SPAN_SECS {
        // The open bucket's span has fully elapsed; the observation opens
        // the next one.
        append_bucket(
            store,
            &mut average,
            bucket.timestamp + BUCKET_SPAN_SECS,
            new_value,
        )?;
    } else {
        // Still inside the open bucket: the latest value wins. Swap the
        // bucket's contribution out of the mean, term by term.
        let n = average.index.min(WINDOW);
        average.value = average.value - bucket.value.div_int(n) + new_value.div_int(n);
        bucket.value = new_value;
        store.put_rolling_bucket(&bucket)?;
    }

    store.put_rolling_average(&average)?;
    Ok((average.index, average.value))
}

/// Append one bucket and fold its value into the mean: a growing window
/// takes the incremental running mean, a full window swaps the evicted
/// bucket's contribution for the new one.
fn append_bucket(
    store: &StoreManager,
    average: &mut RollingAverage,
    timestamp: i64,
    value: Wad,
) -> IndexerResult<RollingBucket> {
    let next_index = average.index + 1;
    if next_index <= WINDOW {
        average.value = (average.value.mul_int(next_index - 1) + value).div_int(next_index);
    } else {
        let evicted = store.require_rolling_bucket(average.series, next_index - WINDOW)?;
        average.value = average.value + value.div_int(WINDOW) - evicted.value.div_int(WINDOW);
    }
    average.index = next_index;

    let bucket = RollingBucket {
        series: average.series,
        index: next_index,
        timestamp,
        value,
    };
    store.put_rolling_bucket(&bucket)?;
    Ok(bucket)
}
