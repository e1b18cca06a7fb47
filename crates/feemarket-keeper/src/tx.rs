//! Transaction envelope
//!
//! The fee pipeline only needs a narrow view of a transaction: its
//! messages and, for fee-bearing envelopes, the fee, gas limit, payer and
//! optional granter.

use feemarket_common::{Address, Coin};
use prost_types::Any;

/// Any transaction the host hands to the pipeline
pub trait Tx {
    fn messages(&self) -> &[Any];

    /// Fee view, `None` when the envelope carries no fee
    fn as_fee_tx(&self) -> Option<&dyn FeeTx>;
}

/// Fee-bearing transaction
pub trait FeeTx {
    fn fee(&self) -> &[Coin];
    fn gas_limit(&self) -> u64;
    fn fee_payer(&self) -> &Address;
    fn fee_granter(&self) -> Option<&Address>;
    fn messages(&self) -> &[Any];
}

/// Standard fee-bearing transaction
#[derive(Debug, Clone, Default)]
pub struct StdTx {
    pub messages: Vec<Any>,
    pub fee: Vec<Coin>,
    pub gas_limit: u64,
    pub payer: Address,
    pub granter: Option<Address>,
}

impl StdTx {
    pub fn new(payer: Address, fee: Vec<Coin>, gas_limit: u64) -> Self {
        Self {
            payer,
            fee,
            gas_limit,
            ..Default::default()
        }
    }

    pub fn with_granter(mut self, granter: Address) -> Self {
        self.granter = Some(granter);
        self
    }
}

impl FeeTx for StdTx {
    fn fee(&self) -> &[Coin] {
        &self.fee
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn fee_payer(&self) -> &Address {
        &self.payer
    }

    fn fee_granter(&self) -> Option<&Address> {
        self.granter.as_ref()
    }

    fn messages(&self) -> &[Any] {
        &self.messages
    }
}

impl Tx for StdTx {
    fn messages(&self) -> &[Any] {
        &self.messages
    }

    fn as_fee_tx(&self) -> Option<&dyn FeeTx> {
        Some(self)
    }
}
