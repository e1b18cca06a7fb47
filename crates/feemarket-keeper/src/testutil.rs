//! In-memory collaborators for tests and local tooling

use feemarket_common::{Address, Coin, DecCoin, FeeMarketError, Result};
use parking_lot::RwLock;
use prost_types::Any;
use std::collections::{BTreeMap, BTreeSet};

use crate::expected_keepers::{AccountOps, BalanceOps, DenomResolver, FeeGrantOps};
use crate::tx::{FeeTx, Tx};

/// Resolver converting 1:1 into any denom it advertises
#[derive(Debug, Clone, Default)]
pub struct TestDenomResolver {
    extra: Vec<String>,
}

impl TestDenomResolver {
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra: extra.into_iter().map(Into::into).collect(),
        }
    }
}

impl DenomResolver for TestDenomResolver {
    fn convert_to_denom(&self, coin: &DecCoin, denom: &str) -> Result<DecCoin> {
        Ok(DecCoin::new(denom, coin.amount))
    }

    fn extra_denoms(&self) -> Result<Vec<String>> {
        Ok(self.extra.clone())
    }
}

/// Resolver that always fails
#[derive(Debug, Clone, Default)]
pub struct ErrorDenomResolver;

impl DenomResolver for ErrorDenomResolver {
    fn convert_to_denom(&self, coin: &DecCoin, denom: &str) -> Result<DecCoin> {
        Err(FeeMarketError::InvalidRequest(format!(
            "cannot convert {} to {}",
            coin, denom
        )))
    }

    fn extra_denoms(&self) -> Result<Vec<String>> {
        Err(FeeMarketError::InvalidRequest("no extra denoms".to_string()))
    }
}

/// Balance holder for accounts and module accounts
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Holder {
    Account(Address),
    Module(String),
}

/// In-memory bank and account store
#[derive(Debug, Default)]
pub struct MemBank {
    balances: RwLock<BTreeMap<(Holder, String), u128>>,
    accounts: RwLock<BTreeSet<Address>>,
}

impl MemBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `addr` and credit it with `coin`
    pub fn fund(&self, addr: &Address, coin: Coin) {
        self.accounts.write().insert(addr.clone());
        *self
            .balances
            .write()
            .entry((Holder::Account(addr.clone()), coin.denom))
            .or_default() += coin.amount;
    }

    pub fn create_account(&self, addr: &Address) {
        self.accounts.write().insert(addr.clone());
    }

    pub fn balance(&self, addr: &Address, denom: &str) -> u128 {
        self.get(&Holder::Account(addr.clone()), denom)
    }

    pub fn module_balance(&self, module: &str, denom: &str) -> u128 {
        self.get(&Holder::Module(module.to_string()), denom)
    }

    fn get(&self, holder: &Holder, denom: &str) -> u128 {
        self.balances
            .read()
            .get(&(holder.clone(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&self, from: Holder, to: Holder, amount: &[Coin]) -> Result<()> {
        let mut balances = self.balances.write();

        for coin in amount {
            let have = balances
                .get(&(from.clone(), coin.denom.clone()))
                .copied()
                .unwrap_or(0);
            if have < coin.amount {
                return Err(FeeMarketError::InsufficientFunds(format!(
                    "{}{} is smaller than {}",
                    have, coin.denom, coin
                )));
            }
        }

        for coin in amount {
            *balances
                .entry((from.clone(), coin.denom.clone()))
                .or_default() -= coin.amount;
            *balances.entry((to.clone(), coin.denom.clone())).or_default() += coin.amount;
        }
        Ok(())
    }
}

impl BalanceOps for MemBank {
    fn send_to_module(&self, sender: &Address, module: &str, amount: &[Coin]) -> Result<()> {
        self.transfer(
            Holder::Account(sender.clone()),
            Holder::Module(module.to_string()),
            amount,
        )
    }

    fn send_module_to_module(&self, sender: &str, recipient: &str, amount: &[Coin]) -> Result<()> {
        self.transfer(
            Holder::Module(sender.to_string()),
            Holder::Module(recipient.to_string()),
            amount,
        )
    }

    fn send_module_to_account(
        &self,
        module: &str,
        recipient: &Address,
        amount: &[Coin],
    ) -> Result<()> {
        self.accounts.write().insert(recipient.clone());
        self.transfer(
            Holder::Module(module.to_string()),
            Holder::Account(recipient.clone()),
            amount,
        )
    }
}

impl AccountOps for MemBank {
    fn has_account(&self, addr: &Address) -> bool {
        self.accounts.read().contains(addr)
    }
}

/// Fee grant store holding one allowance per (granter, grantee)
#[derive(Debug, Default)]
pub struct MemFeeGrant {
    allowances: RwLock<BTreeMap<(Address, Address), Coin>>,
}

impl MemFeeGrant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, granter: &Address, grantee: &Address, limit: Coin) {
        self.allowances
            .write()
            .insert((granter.clone(), grantee.clone()), limit);
    }

    pub fn remaining(&self, granter: &Address, grantee: &Address) -> Option<Coin> {
        self.allowances
            .read()
            .get(&(granter.clone(), grantee.clone()))
            .cloned()
    }
}

impl FeeGrantOps for MemFeeGrant {
    fn use_granted_fees(
        &self,
        granter: &Address,
        grantee: &Address,
        fee: &[Coin],
        _msgs: &[Any],
    ) -> Result<()> {
        let mut allowances = self.allowances.write();
        let allowance = allowances
            .get_mut(&(granter.clone(), grantee.clone()))
            .ok_or_else(|| FeeMarketError::Unauthorized("fee allowance not found".to_string()))?;

        let mut remaining = allowance.clone();
        for coin in fee {
            remaining = remaining.checked_sub(coin).map_err(|_| {
                FeeMarketError::Unauthorized(format!("fee limit exceeded: {} > {}", coin, allowance))
            })?;
        }
        *allowance = remaining;
        Ok(())
    }
}

/// Transaction without a fee interface
#[derive(Debug, Clone, Default)]
pub struct BareTx {
    pub messages: Vec<Any>,
}

impl Tx for BareTx {
    fn messages(&self) -> &[Any] {
        &self.messages
    }

    fn as_fee_tx(&self) -> Option<&dyn FeeTx> {
        None
    }
}
