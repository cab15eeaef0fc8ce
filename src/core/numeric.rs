//! 18-decimal fixed-point arithmetic
//!
//! All value math in the indexer runs on integer-scaled `Wad` values
//! (1e18 = 1.0) with division truncating toward zero, so replays reproduce
//! the same numbers bit for bit. Products that would overflow go through
//! 256-bit intermediates. Signed representation: rolling-mean updates
//! subtract truncated terms and may transiently dip below zero by a few
//! units of drift.

use ethnum::U256;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Scale factor: 1.0 in wad units.
pub const WAD_SCALE: i128 = 1_000_000_000_000_000_000;

/// 18-decimal fixed-point value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wad(pub i128);

impl Wad {
    pub const ZERO: Wad = Wad(0);
    pub const ONE: Wad = Wad(WAD_SCALE);

    /// Wrap a raw wad-scaled integer.
    pub const fn from_raw(raw: i128) -> Self {
        Wad(raw)
    }

    /// Whole units, scaled up.
    pub const fn from_units(units: u64) -> Self {
        Wad(units as i128 * WAD_SCALE)
    }

    pub const fn raw(self) -> i128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Truncating division by an integer count. Divisor of zero yields
    /// zero; callers guarantee non-zero counts structurally.
    pub fn div_int(self, n: u64) -> Wad {
        if n == 0 {
            return Wad::ZERO;
        }
        Wad(self.0 / n as i128)
    }

    /// Multiplication by an integer count.
    pub fn mul_int(self, n: u64) -> Wad {
        Wad(self.0 * n as i128)
    }

    /// `self * other / 1e18`, truncating, via a 256-bit intermediate.
    pub fn mul_wad(self, other: Wad) -> Wad {
        let negative = (self.0 < 0) != (other.0 < 0);
        let product = U256::from(self.0.unsigned_abs()) * U256::from(other.0.unsigned_abs());
        let magnitude = (product / U256::from(WAD_SCALE as u128)).as_u128() as i128;
        Wad(if negative { -magnitude } else { magnitude })
    }

    /// `self * 1e18 / other`, truncating. A zero divisor yields zero,
    /// matching the degrade-to-zero policy for unusable inputs.
    pub fn div_wad(self, other: Wad) -> Wad {
        if other.0 == 0 {
            return Wad::ZERO;
        }
        let negative = (self.0 < 0) != (other.0 < 0);
        let scaled = U256::from(self.0.unsigned_abs()) * U256::from(WAD_SCALE as u128);
        let magnitude = (scaled / U256::from(other.0.unsigned_abs())).as_u128() as i128;
        Wad(if negative { -magnitude } else { magnitude })
    }

    pub fn min(self, other: Wad) -> Wad {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Wad) -> Wad {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    /// Human-readable decimal, for logs and display only. Magnitudes
    /// beyond `Decimal` range collapse to zero rather than failing a log
    /// line.
    pub fn to_decimal(self) -> Decimal {
        Decimal::try_from_i128_with_scale(self.0, 18).unwrap_or_default()
    }
}

// Raw wad integers exceed what JSON numbers carry losslessly, so they
// travel as decimal strings, the way on-chain amounts usually do.
impl Serialize for Wad {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Wad {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<i128>()
            .map(Wad)
            .map_err(|e| de::Error::custom(format!("invalid wad value {:?}: {}", s, e)))
    }
}

impl Add for Wad {
    type Output = Wad;

    fn add(self, rhs: Wad) -> Wad {
        Wad(self.0 + rhs.0)
    }
}

impl AddAssign for Wad {
    fn add_assign(&mut self, rhs: Wad) {
        self.0 += rhs.0;
    }
}

impl Sub for Wad {
    type Output = Wad;

    fn sub(self, rhs: Wad) -> Wad {
        Wad(self.0 - rhs.0)
    }
}

impl SubAssign for Wad {
    fn sub_assign(&mut self, rhs: Wad) {
        self.0 -= rhs.0;
    }
}

impl Sum for Wad {
    fn sum<I: Iterator<Item = Wad>>(iter: I) -> Wad {
        iter.fold(Wad::ZERO, |acc, v| acc + v)
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_is_one() {
        assert_eq!(Wad::ONE.to_decimal(), Decimal::from(1));
    }

    #[test]
    fn test_from_units() {
        assert_eq!(Wad::from_units(2500).raw(), 2_500 * WAD_SCALE);
    }

    #[test]
    fn test_div_int_truncates() {
        // 10 / 3 = 3.333... truncated at the 18th decimal
        let v = Wad::from_units(10).div_int(3);
        assert_eq!(v.raw(), 3_333_333_333_333_333_333);
    }

    #[test]
    fn test_div_int_truncates_toward_zero_for_negative() {
        let v = Wad::from_raw(-7).div_int(2);
        assert_eq!(v.raw(), -3);
    }

    #[test]
    fn test_mul_wad_survives_large_magnitudes() {
        // 1e9 tokens * $2000 would overflow i128 without the wide intermediate
        let reserve = Wad::from_units(1_000_000_000);
        let price = Wad::from_units(2_000);
        assert_eq!(reserve.mul_wad(price), Wad::from_units(2_000_000_000_000));
    }

    #[test]
    fn test_div_wad_zero_divisor_degrades_to_zero() {
        assert_eq!(Wad::ONE.div_wad(Wad::ZERO), Wad::ZERO);
    }

    #[test]
    fn test_div_wad_truncates() {
        // 1 / 3
        let v = Wad::ONE.div_wad(Wad::from_units(3));
        assert_eq!(v.raw(), 333_333_333_333_333_333);
    }
}
