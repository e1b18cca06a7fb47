//! Coin types
//!
//! - [`Coin`]: an integral amount of a single denomination, as carried in a
//!   transaction fee or moved between accounts
//! - [`DecCoin`]: a decimal amount, used for per-gas prices

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FeeMarketError, Result};

/// Integral amount of one denomination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Zero-valued coin in `denom`
    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// `self >= other`, denominations must match
    pub fn is_gte(&self, other: &Coin) -> Result<bool> {
        self.ensure_same_denom(other)?;
        Ok(self.amount >= other.amount)
    }

    /// `self - other`, failing on denomination mismatch or underflow
    pub fn checked_sub(&self, other: &Coin) -> Result<Coin> {
        self.ensure_same_denom(other)?;
        let amount = self.amount.checked_sub(other.amount).ok_or_else(|| {
            FeeMarketError::InsufficientFee(format!("{} is smaller than {}", self, other))
        })?;
        Ok(Coin::new(self.denom.clone(), amount))
    }

    /// Amount as a decimal, saturating at `Decimal::MAX`
    pub fn amount_dec_saturating(&self) -> Decimal {
        Decimal::from_u128(self.amount).unwrap_or(Decimal::MAX)
    }

    fn ensure_same_denom(&self, other: &Coin) -> Result<()> {
        if self.denom != other.denom {
            return Err(FeeMarketError::InvalidRequest(format!(
                "denom mismatch: {} vs {}",
                self.denom, other.denom
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A list of coins as found in a transaction fee
pub type Coins = Vec<Coin>;

/// Render a coin list the way it appears in event attributes
pub fn coins_to_string(coins: &[Coin]) -> String {
    coins
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decimal amount of one denomination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: Decimal,
}

impl DecCoin {
    pub fn new(denom: impl Into<String>, amount: Decimal) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Integral coin rounding the amount up
    pub fn ceil_to_coin(&self) -> Result<Coin> {
        let amount = self.amount.ceil().to_u128().ok_or_else(|| {
            FeeMarketError::InsufficientFee(format!(
                "cannot express {} as an integral amount",
                self
            ))
        })?;
        Ok(Coin::new(self.denom.clone(), amount))
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_coin_display() {
        assert_eq!(Coin::new("stake", 30).to_string(), "30stake");
        assert_eq!(
            coins_to_string(&[Coin::new("stake", 1), Coin::new("atom", 2)]),
            "1stake,2atom"
        );
    }

    #[test]
    fn test_checked_sub() {
        let a = Coin::new("stake", 30);
        let b = Coin::new("stake", 20);
        assert_eq!(a.checked_sub(&b).unwrap(), Coin::new("stake", 10));
        assert!(b.checked_sub(&a).is_err());
        assert!(a.checked_sub(&Coin::new("atom", 1)).is_err());
    }

    #[test]
    fn test_is_gte() {
        let a = Coin::new("stake", 30);
        assert!(a.is_gte(&Coin::new("stake", 30)).unwrap());
        assert!(!a.is_gte(&Coin::new("stake", 31)).unwrap());
    }

    #[test]
    fn test_amount_dec_saturates() {
        assert_eq!(Coin::new("stake", 30).amount_dec_saturating(), dec!(30));
        assert_eq!(Coin::new("stake", u128::MAX).amount_dec_saturating(), Decimal::MAX);
    }

    #[test]
    fn test_ceil_to_coin() {
        let c = DecCoin::new("stake", dec!(12.01));
        assert_eq!(c.ceil_to_coin().unwrap(), Coin::new("stake", 13));
        let c = DecCoin::new("stake", dec!(12));
        assert_eq!(c.ceil_to_coin().unwrap(), Coin::new("stake", 12));
        assert!(DecCoin::new("stake", dec!(-1)).ceil_to_coin().is_err());
    }
}
