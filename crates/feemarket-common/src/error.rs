//! Error types for the fee market
//!
//! Every failure the module can surface is one variant of [`FeeMarketError`].
//! Each variant maps to a stable `(codespace, code)` pair so RPC callers can
//! discriminate by code instead of by message text.

use thiserror::Error;

/// Result type alias using FeeMarketError
pub type Result<T> = std::result::Result<T, FeeMarketError>;

/// Codespace for errors registered by this module
pub const MODULE_CODESPACE: &str = "feemarket";

/// Codespace for errors shared with the host chain
pub const HOST_CODESPACE: &str = "sdk";

/// Unified error type for fee market operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeMarketError {
    // Fee coin cardinality
    #[error("no fee coin provided, must provide one: {0}")]
    NoFeeCoins(String),

    #[error("too many fee coins provided, only one fee coin may be provided: {0}")]
    TooManyFeeCoins(String),

    // Fee sufficiency and payment
    #[error("insufficient fee: {0}")]
    InsufficientFee(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    // Transaction shape
    #[error("invalid gas limit: {0}")]
    InvalidGasLimit(String),

    #[error("invalid transaction shape: {0}")]
    InvalidTxShape(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown address: {0}")]
    UnknownAddress(String),

    // Governance
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    // Denomination resolution
    #[error("denom resolver not set: {0}")]
    ResolverNotSet(String),

    // Window accumulator
    #[error("block utilization overflow: {0}")]
    BlockUtilizationOverflow(String),

    // Persistence
    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("codec error: {0}")]
    Codec(String),
}

impl FeeMarketError {
    /// Numeric code, stable across releases
    pub fn code(&self) -> u32 {
        match self {
            FeeMarketError::NoFeeCoins(_) => 2,
            FeeMarketError::TooManyFeeCoins(_) => 3,
            FeeMarketError::ResolverNotSet(_) => 4,
            FeeMarketError::BlockUtilizationOverflow(_) => 5,
            FeeMarketError::InvalidParams(_) => 6,
            FeeMarketError::InvalidGenesis(_) => 7,
            FeeMarketError::InvalidState(_) => 8,
            FeeMarketError::Store(_) => 9,
            FeeMarketError::Codec(_) => 10,
            FeeMarketError::InvalidTxShape(_) => 2,
            FeeMarketError::Unauthorized(_) => 4,
            FeeMarketError::InsufficientFunds(_) => 5,
            FeeMarketError::UnknownAddress(_) => 9,
            FeeMarketError::InsufficientFee(_) => 13,
            FeeMarketError::InvalidRequest(_) => 18,
            FeeMarketError::InvalidGasLimit(_) => 41,
        }
    }

    /// Namespace the code is registered under
    pub fn codespace(&self) -> &'static str {
        match self {
            FeeMarketError::InvalidTxShape(_)
            | FeeMarketError::Unauthorized(_)
            | FeeMarketError::InsufficientFunds(_)
            | FeeMarketError::UnknownAddress(_)
            | FeeMarketError::InsufficientFee(_)
            | FeeMarketError::InvalidRequest(_)
            | FeeMarketError::InvalidGasLimit(_) => HOST_CODESPACE,
            _ => MODULE_CODESPACE,
        }
    }

    /// Context message without the kind prefix
    pub fn context(&self) -> &str {
        match self {
            FeeMarketError::NoFeeCoins(msg)
            | FeeMarketError::TooManyFeeCoins(msg)
            | FeeMarketError::InsufficientFee(msg)
            | FeeMarketError::InsufficientFunds(msg)
            | FeeMarketError::InvalidGasLimit(msg)
            | FeeMarketError::InvalidTxShape(msg)
            | FeeMarketError::InvalidRequest(msg)
            | FeeMarketError::UnknownAddress(msg)
            | FeeMarketError::Unauthorized(msg)
            | FeeMarketError::InvalidParams(msg)
            | FeeMarketError::ResolverNotSet(msg)
            | FeeMarketError::BlockUtilizationOverflow(msg)
            | FeeMarketError::InvalidGenesis(msg)
            | FeeMarketError::InvalidState(msg)
            | FeeMarketError::Store(msg)
            | FeeMarketError::Codec(msg) => msg,
        }
    }

    fn context_mut(&mut self) -> &mut String {
        match self {
            FeeMarketError::NoFeeCoins(msg)
            | FeeMarketError::TooManyFeeCoins(msg)
            | FeeMarketError::InsufficientFee(msg)
            | FeeMarketError::InsufficientFunds(msg)
            | FeeMarketError::InvalidGasLimit(msg)
            | FeeMarketError::InvalidTxShape(msg)
            | FeeMarketError::InvalidRequest(msg)
            | FeeMarketError::UnknownAddress(msg)
            | FeeMarketError::Unauthorized(msg)
            | FeeMarketError::InvalidParams(msg)
            | FeeMarketError::ResolverNotSet(msg)
            | FeeMarketError::BlockUtilizationOverflow(msg)
            | FeeMarketError::InvalidGenesis(msg)
            | FeeMarketError::InvalidState(msg)
            | FeeMarketError::Store(msg)
            | FeeMarketError::Codec(msg) => msg,
        }
    }

    /// Prefix additional context, keeping the kind (and therefore the code)
    pub fn wrap(mut self, context: impl std::fmt::Display) -> Self {
        let msg = self.context_mut();
        *msg = if msg.is_empty() {
            context.to_string()
        } else {
            format!("{}: {}", context, msg)
        };
        self
    }

    /// True when both errors carry the same kind, ignoring context
    pub fn is_kind(&self, other: &FeeMarketError) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<prost::DecodeError> for FeeMarketError {
    fn from(err: prost::DecodeError) -> Self {
        FeeMarketError::Codec(err.to_string())
    }
}

impl From<serde_json::Error> for FeeMarketError {
    fn from(err: serde_json::Error) -> Self {
        FeeMarketError::Codec(err.to_string())
    }
}

impl From<std::io::Error> for FeeMarketError {
    fn from(err: std::io::Error) -> Self {
        FeeMarketError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeeMarketError::InsufficientFee("got 10stake, required 20stake".to_string());
        assert!(err.to_string().contains("required 20stake"));
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(FeeMarketError::NoFeeCoins(String::new()).code(), 2);
        assert_eq!(FeeMarketError::TooManyFeeCoins(String::new()).code(), 3);
        assert_eq!(FeeMarketError::InsufficientFee(String::new()).code(), 13);
        assert_eq!(FeeMarketError::InvalidGasLimit(String::new()).code(), 41);
        assert_eq!(FeeMarketError::InvalidGasLimit(String::new()).codespace(), HOST_CODESPACE);
        assert_eq!(FeeMarketError::ResolverNotSet(String::new()).codespace(), MODULE_CODESPACE);
    }

    #[test]
    fn test_wrap_keeps_kind() {
        let err = FeeMarketError::InsufficientFunds("0stake < 10stake".to_string())
            .wrap("failed to escrow fee");
        assert!(err.is_kind(&FeeMarketError::InsufficientFunds(String::new())));
        assert_eq!(err.code(), 5);
        assert_eq!(err.context(), "failed to escrow fee: 0stake < 10stake");
    }

    #[test]
    fn test_wrap_empty_context() {
        let err = FeeMarketError::ResolverNotSet(String::new()).wrap("denom atom");
        assert_eq!(err.context(), "denom atom");
    }
}
