//! OHLCV candle models
//!
//! Each tracked instrument carries one in-progress singleton per
//! resolution plus an append-only history of closed candles. Prices are
//! kept on two tracks: trade-denominated (with volume) and
//! oracle-denominated (no volume, the oracle has no trade size).

use crate::core::{Address, Wad};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported candle resolutions.
///
/// Ordered from shortest to longest for iteration purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// 1-minute candles
    M1,
    /// 10-minute candles
    M10,
    /// 1-hour candles
    H1,
    /// 6-hour candles
    H6,
    /// 1-day candles
    D1,
    /// 1-week candles
    W1,
}

impl Resolution {
    /// All resolutions in ascending order.
    pub const ALL: [Resolution; 6] = [
        Resolution::M1,
        Resolution::M10,
        Resolution::H1,
        Resolution::H6,
        Resolution::D1,
        Resolution::W1,
    ];

    /// Span in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        match self {
            Self::M1 => 1,
            Self::M10 => 10,
            Self::H1 => 60,
            Self::H6 => 360,
            Self::D1 => 1_440,
            Self::W1 => 10_080,
        }
    }

    /// Span in seconds.
    #[must_use]
    pub const fn duration_secs(&self) -> i64 {
        self.minutes() as i64 * 60
    }

    /// Stable single-byte tag used in storage keys.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::M1 => 0,
            Self::M10 => 1,
            Self::H1 => 2,
            Self::H6 => 3,
            Self::D1 => 4,
            Self::W1 => 5,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::M1 => write!(f, "1m"),
            Self::M10 => write!(f, "10m"),
            Self::H1 => write!(f, "1h"),
            Self::H6 => write!(f, "6h"),
            Self::D1 => write!(f, "1d"),
            Self::W1 => write!(f, "1w"),
        }
    }
}

/// The in-progress candle for one `(instrument, resolution)` pair.
///
/// Mutable in place until its span elapses, then archived as a [`Candle`]
/// and reset. Both price tracks roll over on the same clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleSingleton {
    pub instrument: Address,
    pub resolution: Resolution,
    /// Start time of the in-progress span.
    pub timestamp: i64,

    // Trade-price track
    pub open: Wad,
    pub high: Wad,
    pub low: Wad,
    pub close: Wad,
    pub volume: Wad,

    // Oracle-price track
    pub open_oracle: Wad,
    pub high_oracle: Wad,
    pub low_oracle: Wad,
    pub close_oracle: Wad,
}

impl CandleSingleton {
    /// Fresh singleton opened at `timestamp` with both tracks flat at the
    /// given prices and zero volume.
    pub fn opened_at(
        instrument: Address,
        resolution: Resolution,
        timestamp: i64,
        price: Wad,
        oracle_price: Wad,
    ) -> Self {
        Self {
            instrument,
            resolution,
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: Wad::ZERO,
            open_oracle: oracle_price,
            high_oracle: oracle_price,
            low_oracle: oracle_price,
            close_oracle: oracle_price,
        }
    }
}

/// An immutable closed candle row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub instrument: Address,
    pub resolution: Resolution,
    pub timestamp: i64,

    pub open: Wad,
    pub high: Wad,
    pub low: Wad,
    pub close: Wad,
    pub volume: Wad,

    pub open_oracle: Wad,
    pub high_oracle: Wad,
    pub low_oracle: Wad,
    pub close_oracle: Wad,
}

impl Candle {
    /// Archive the given singleton state as a closed row.
    pub fn from_singleton(s: &CandleSingleton) -> Self {
        Self {
            instrument: s.instrument,
            resolution: s.resolution,
            timestamp: s.timestamp,
            open: s.open,
            high: s.high,
            low: s.low,
            close: s.close,
            volume: s.volume,
            open_oracle: s.open_oracle,
            high_oracle: s.high_oracle,
            low_oracle: s.low_oracle,
            close_oracle: s.close_oracle,
        }
    }
}

/// Storage key for the singleton of `(instrument, resolution)`.
pub fn singleton_key(instrument: Address, resolution: Resolution) -> [u8; 21] {
    let mut key = [0u8; 21];
    key[..20].copy_from_slice(instrument.as_bytes());
    key[20] = resolution.tag();
    key
}

/// Storage key for a closed candle; big-endian timestamp keeps history
/// rows ordered under the `(instrument, resolution)` prefix.
pub fn history_key(instrument: Address, resolution: Resolution, timestamp: i64) -> [u8; 29] {
    let mut key = [0u8; 29];
    key[..21].copy_from_slice(&singleton_key(instrument, resolution));
    key[21..].copy_from_slice(&timestamp.to_be_bytes());
    key
}

/// Prefix covering all closed candles of `(instrument, resolution)`.
pub fn history_prefix(instrument: Address, resolution: Resolution) -> [u8; 21] {
    singleton_key(instrument, resolution)
}
