//! # Fee Market Keeper
//!
//! AIMD EIP-1559 fee market module.
//!
//! ## Per-block flow
//!
//! ```text
//!  tx ──► ante (check + escrow) ──► messages ──► post (settle + tip + record)
//!                                                        │
//!  end block ◄──────────────── window[index] += gas ─────┘
//!      │
//!      ├─ learning rate  (AIMD on average utilization)
//!      ├─ base gas price (price × (1 + lr × error) + net × delta)
//!      └─ advance window
//! ```
//!
//! ## Components
//!
//! - [`keeper::FeeMarketKeeper`]: params, state and enabled height storage,
//!   gas price queries and the end-block controller
//! - [`ante::FeeMarketCheckDecorator`]: pre-phase fee check and escrow
//! - [`post::FeeMarketDeductDecorator`]: post-phase settlement and tip
//! - [`msg_server::MsgServer`]: authority-gated parameter changes
//! - [`query_server::QueryServer`]: read-only queries

pub mod ante;
pub mod env;
pub mod expected_keepers;
pub mod keeper;
pub mod module;
pub mod msg_server;
pub mod post;
pub mod query_server;
pub mod store;
pub mod tx;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

use feemarket_common::Address;
use serde::{Deserialize, Serialize};

pub use ante::{AnteDecorator, FeeMarketCheckDecorator};
pub use env::{GasMeter, HostEnv};
pub use expected_keepers::{AccountOps, BalanceOps, DenomResolver, FeeGrantOps};
pub use keeper::FeeMarketKeeper;
pub use module::FeeMarketModule;
pub use msg_server::{MsgParams, MsgParamsResponse, MsgServer};
pub use post::{FeeMarketDeductDecorator, PostDecorator};
pub use query_server::QueryServer;
pub use store::{KvStore, MemStore};
pub use tx::{FeeTx, StdTx, Tx};

/// Default scale applied to the normalized tip price when computing priority
pub const DEFAULT_PRIORITY_SCALE: i64 = 1_000_000;

/// Gas a simulated transaction is charged for the settlement transfers
pub const BANK_SEND_GAS_CONSUMPTION: u64 = 12_490;

/// Fee market module configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeMarketConfig {
    /// Identity allowed to change params
    pub authority: Address,
    /// Scale of the priority integer
    pub priority_scale: i64,
    /// Extra gas charged in simulation for settlement
    pub simulation_send_gas: u64,
}

impl Default for FeeMarketConfig {
    fn default() -> Self {
        Self {
            authority: Address::module("gov"),
            priority_scale: DEFAULT_PRIORITY_SCALE,
            simulation_send_gas: BANK_SEND_GAS_CONSUMPTION,
        }
    }
}

impl FeeMarketConfig {
    pub fn with_authority(mut self, authority: Address) -> Self {
        self.authority = authority;
        self
    }
}
