//! Collaborator capabilities the module depends on
//!
//! Balances, accounts, fee grants and denomination conversion are owned by
//! other modules of the host. The fee market only sees these traits.

use feemarket_common::{Address, Coin, DecCoin, Result};
use prost_types::Any;

/// Coin movement between accounts and module accounts
#[cfg_attr(test, mockall::automock)]
pub trait BalanceOps: Send + Sync {
    /// Move `amount` from an account into a module account.
    /// Fails with `InsufficientFunds` when the sender lacks balance.
    fn send_to_module(&self, sender: &Address, module: &str, amount: &[Coin]) -> Result<()>;

    fn send_module_to_module(&self, sender: &str, recipient: &str, amount: &[Coin]) -> Result<()>;

    fn send_module_to_account(&self, module: &str, recipient: &Address, amount: &[Coin])
        -> Result<()>;
}

/// Account existence
#[cfg_attr(test, mockall::automock)]
pub trait AccountOps: Send + Sync {
    fn has_account(&self, addr: &Address) -> bool;
}

/// Optional fee allowance store
#[cfg_attr(test, mockall::automock)]
pub trait FeeGrantOps: Send + Sync {
    /// Consume `fee` from the allowance `granter` gave `grantee`
    fn use_granted_fees(
        &self,
        granter: &Address,
        grantee: &Address,
        fee: &[Coin],
        msgs: &[Any],
    ) -> Result<()>;
}

/// Conversion between fee denominations
#[cfg_attr(test, mockall::automock)]
pub trait DenomResolver: Send + Sync {
    /// Express `coin` in `denom`
    fn convert_to_denom(&self, coin: &DecCoin, denom: &str) -> Result<DecCoin>;

    /// Denominations accepted besides the fee denom
    fn extra_denoms(&self) -> Result<Vec<String>>;
}
