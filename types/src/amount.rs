//! Token amounts on both sides of the migration.
//!
//! Legacy coins carry a `whole` part plus a `fractional` part at 1e9 scale.
//! New-ledger amounts are integers in micro units (`uiov`, 1e6 per IOV).
//! Conversion is exact integer arithmetic; sub-micro dust is truncated.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Legacy fractional units per whole token.
pub const FRACTIONAL_SCALE: u64 = 1_000_000_000;

/// Micro units per whole token on the new ledger.
pub const MICRO_PER_IOV: u64 = 1_000_000;

/// Legacy fractional units per micro unit.
const FRACTIONAL_PER_MICRO: u64 = FRACTIONAL_SCALE / MICRO_PER_IOV;

/// Ticker of the migrated token in the dump.
pub const IOV_TICKER: &str = "IOV";

/// Denomination of the migrated token in the new genesis.
pub const MICRO_DENOM: &str = "uiov";

/// A coin as it appears in the legacy dump.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCoin {
    #[serde(default)]
    pub whole: u64,
    #[serde(default)]
    pub fractional: u64,
    pub ticker: String,
}

impl LegacyCoin {
    pub fn iov(whole: u64, fractional: u64) -> Self {
        Self {
            whole,
            fractional,
            ticker: IOV_TICKER.to_string(),
        }
    }

    pub fn is_iov(&self) -> bool {
        self.ticker == IOV_TICKER
    }

    /// Human-readable float value, for audit fields only.
    pub fn as_float(&self) -> f64 {
        self.whole as f64 + self.fractional as f64 / FRACTIONAL_SCALE as f64
    }

    /// Exact value in micro units.
    pub fn micro(&self) -> MicroIov {
        MicroIov::new(
            u128::from(self.whole) * u128::from(MICRO_PER_IOV)
                + u128::from(self.fractional / FRACTIONAL_PER_MICRO),
        )
    }
}

/// Total IOV held in a coin list, ignoring other tickers.
pub fn iov_micro_total(coins: &[LegacyCoin]) -> MicroIov {
    coins.iter().filter(|c| c.is_iov()).map(LegacyCoin::micro).sum()
}

/// Total IOV as an audit float, ignoring other tickers.
pub fn iov_float_total(coins: &[LegacyCoin]) -> f64 {
    coins.iter().filter(|c| c.is_iov()).map(LegacyCoin::as_float).sum()
}

/// An integer amount in micro units.
///
/// Serialized as a decimal string, the way the new genesis expects it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MicroIov(u128);

impl MicroIov {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Whole-token float for audit fields.
    pub fn as_float(&self) -> f64 {
        self.0 as f64 / MICRO_PER_IOV as f64
    }
}

impl Add for MicroIov {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for MicroIov {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for MicroIov {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for MicroIov {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MicroIov {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for MicroIov {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>()
            .map(Self)
            .map_err(|e| serde::de::Error::custom(format!("invalid amount {s:?}: {e}")))
    }
}

/// A coin in the new genesis: `{ "denom": "uiov", "amount": "123" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: MicroIov,
}

impl Coin {
    pub fn uiov(amount: MicroIov) -> Self {
        Self {
            denom: MICRO_DENOM.to_string(),
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn micro_conversion_is_exact() {
        let coin = LegacyCoin::iov(3, 500_000_000);
        assert_eq!(coin.micro(), MicroIov::new(3_500_000));
    }

    #[test]
    fn micro_conversion_truncates_dust() {
        let coin = LegacyCoin::iov(0, 1_999);
        assert_eq!(coin.micro(), MicroIov::new(1));
    }

    #[test]
    fn totals_ignore_other_tickers() {
        let coins = vec![
            LegacyCoin::iov(1, 0),
            LegacyCoin {
                whole: 100,
                fractional: 0,
                ticker: "CASH".into(),
            },
            LegacyCoin::iov(2, 250_000_000),
        ];
        assert_eq!(iov_micro_total(&coins), MicroIov::new(3_250_000));
        assert!((iov_float_total(&coins) - 3.25).abs() < 1e-9);
    }

    #[test]
    fn micro_serializes_as_string() {
        let coin = Coin::uiov(MicroIov::new(42));
        let json = serde_json::to_string(&coin).unwrap();
        assert_eq!(json, r#"{"denom":"uiov","amount":"42"}"#);
        let back: Coin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coin);
    }

    #[test]
    fn fractional_defaults_to_zero() {
        let coin: LegacyCoin = serde_json::from_str(r#"{"whole":7,"ticker":"IOV"}"#).unwrap();
        assert_eq!(coin.micro(), MicroIov::new(7_000_000));
    }
}
