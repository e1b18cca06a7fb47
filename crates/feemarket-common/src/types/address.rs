//! Account addresses
//!
//! Addresses are opaque strings supplied by the host. Module accounts are
//! derived deterministically from the module name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FeeMarketError;

/// Number of hash bytes kept for a module address
const MODULE_ADDRESS_LEN: usize = 20;

/// Account address
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Deterministic address of a module account
    pub fn module(name: &str) -> Self {
        let hash = blake3::hash(name.as_bytes());
        Self(hex::encode(&hash.as_bytes()[..MODULE_ADDRESS_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = FeeMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(FeeMarketError::InvalidRequest("empty address".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_address_is_deterministic() {
        let a = Address::module("feemarket-fee-collector");
        let b = Address::module("feemarket-fee-collector");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), MODULE_ADDRESS_LEN * 2);
        assert_ne!(a, Address::module("fee_collector"));
    }

    #[test]
    fn test_parse() {
        assert!("".parse::<Address>().is_err());
        assert_eq!("  alice ".parse::<Address>().unwrap(), Address::new("alice"));
    }
}
