//! Core domain types
//!
//! Addresses and the structured series keys that identify every tracked
//! time series. Keys are explicit composite types; their byte encodings
//! are what the storage layer indexes on.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 20-byte contract or account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if hex.len() != 40 {
            return Err(format!("invalid address length: {}", s));
        }
        let mut out = [0u8; 20];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let byte_str = std::str::from_utf8(chunk).map_err(|e| e.to_string())?;
            out[i] = u8::from_str_radix(byte_str, 16).map_err(|e| e.to_string())?;
        }
        Ok(Address(out))
    }
}

// Addresses travel as 0x-prefixed hex in event files and logs.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Metric tracked by a rolling-average series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Collateral token reserve balance
    CollateralReserve,
    /// Debt token outstanding reserve
    DebtReserve,
    /// Token total supply
    TotalSupply,
    /// Protocol-wide total value locked (USD)
    Tvl,
    /// Staking pool deposit volume
    StakingDeposit,
}

impl SeriesKind {
    fn tag(self) -> u8 {
        match self {
            SeriesKind::CollateralReserve => 0,
            SeriesKind::DebtReserve => 1,
            SeriesKind::TotalSupply => 2,
            SeriesKind::Tvl => 3,
            SeriesKind::StakingDeposit => 4,
        }
    }
}

/// Identity of one rolling-average series: a metric over one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId {
    pub kind: SeriesKind,
    pub instrument: Address,
}

impl SeriesId {
    pub fn new(kind: SeriesKind, instrument: Address) -> Self {
        Self { kind, instrument }
    }

    /// Storage key for the series head record.
    pub fn encode(&self) -> [u8; 21] {
        let mut key = [0u8; 21];
        key[0] = self.kind.tag();
        key[1..].copy_from_slice(self.instrument.as_bytes());
        key
    }

    /// Storage key for bucket `index` of this series.
    pub fn bucket_key(&self, index: u64) -> [u8; 29] {
        let mut key = [0u8; 29];
        key[..21].copy_from_slice(&self.encode());
        key[21..].copy_from_slice(&index.to_be_bytes());
        key
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.kind, self.instrument)
    }
}

/// Protocol-level daily coarse history series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailySeries {
    ReserveUsd,
    MintedUsd,
    TvlUsd,
}

impl DailySeries {
    pub fn tag(self) -> u8 {
        match self {
            DailySeries::ReserveUsd => 0,
            DailySeries::MintedUsd => 1,
            DailySeries::TvlUsd => 2,
        }
    }

    /// Storage key for chunk `index` of this series.
    pub fn chunk_key(self, index: u64) -> [u8; 9] {
        let mut key = [0u8; 9];
        key[0] = self.tag();
        key[1..].copy_from_slice(&index.to_be_bytes());
        key
    }
}

impl fmt::Display for DailySeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DailySeries::ReserveUsd => write!(f, "reserve_usd"),
            DailySeries::MintedUsd => write!(f, "minted_usd"),
            DailySeries::TvlUsd => write!(f, "tvl_usd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_round_trip() {
        let addr: Address = "0x00000000000000000000000000000000000000ab".parse().unwrap();
        assert_eq!(addr.0[19], 0xab);
        assert_eq!(addr.to_string(), "0x00000000000000000000000000000000000000ab");
    }

    #[test]
    fn test_address_rejects_bad_length() {
        assert!("0x1234".parse::<Address>().is_err());
    }

    #[test]
    fn test_series_keys_are_distinct_across_kinds() {
        let a = SeriesId::new(SeriesKind::CollateralReserve, Address::ZERO);
        let b = SeriesId::new(SeriesKind::DebtReserve, Address::ZERO);
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn test_bucket_keys_sort_by_index() {
        let series = SeriesId::new(SeriesKind::Tvl, Address::ZERO);
        assert!(series.bucket_key(1) < series.bucket_key(2));
        assert!(series.bucket_key(255) < series.bucket_key(256));
    }
}
