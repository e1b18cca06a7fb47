//! # Fee Market Common
//!
//! Shared types, errors, and codecs for the AIMD EIP-1559 fee market.
//!
//! ## Core Types
//!
//! - [`Params`]: controller configuration, changed only by the authority
//! - [`State`]: utilization window plus the AIMD learning rate and price math
//! - [`GenesisState`]: params and state loaded at chain start
//! - [`Coin`]/[`DecCoin`]: integral fee amounts and decimal gas prices
//! - [`Address`]: account and module account addresses
//!
//! ## Codec
//!
//! - [`codec`]: fixed-tag protobuf encoding for persisted params and state
//! - [`events`]: events emitted by the fee pipeline

pub mod codec;
pub mod error;
pub mod events;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{FeeMarketError, Result};
pub use events::{Event, EventAttribute};
pub use types::{
    address::Address,
    coin::{coins_to_string, Coin, Coins, DecCoin},
    genesis::GenesisState,
    params::{Params, DEFAULT_FEE_DENOM, DEFAULT_MAX_BLOCK_UTILIZATION, MAX_WINDOW},
    state::State,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Module name, also the store namespace
pub const MODULE_NAME: &str = "feemarket";

/// Module account holding escrowed and soft-burned fees
pub const FEE_COLLECTOR_NAME: &str = "feemarket-fee-collector";

/// Host module account distributing fees to stakers
pub const HOST_FEE_COLLECTOR_NAME: &str = "fee_collector";

/// Store key of the serialized params
pub const KEY_PARAMS: &[u8] = &[0x01];

/// Store key of the serialized state
pub const KEY_STATE: &[u8] = &[0x02];

/// Store key of the enabled height
pub const KEY_ENABLED_HEIGHT: &[u8] = &[0x03];

/// Enabled height meaning never enabled
pub const NEVER_ENABLED_HEIGHT: i64 = -1;
