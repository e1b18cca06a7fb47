//! Pre-phase fee decorator
//!
//! Checks that the single fee coin covers `min_gas_price × gas_limit`,
//! escrows the whole fee into the fee market module account, and annotates
//! the host context with the minimum gas price and the tx priority.

use feemarket_common::{
    coins_to_string, events, Address, Coin, DecCoin, Event, FeeMarketError, Result,
    FEE_COLLECTOR_NAME,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::AnteDecorator;
use crate::env::HostEnv;
use crate::expected_keepers::{AccountOps, BalanceOps, FeeGrantOps};
use crate::keeper::FeeMarketKeeper;
use crate::post::check_tx_fee;
use crate::tx::{FeeTx, Tx};

/// Pre-phase decorator of the fee market
pub struct FeeMarketCheckDecorator {
    keeper: Arc<FeeMarketKeeper>,
    accounts: Arc<dyn AccountOps>,
    bank: Arc<dyn BalanceOps>,
    fee_grant: Option<Arc<dyn FeeGrantOps>>,
    /// Host fee decorator used while the market is disabled
    fallback: Option<Arc<dyn AnteDecorator>>,
}

impl FeeMarketCheckDecorator {
    pub fn new(
        keeper: Arc<FeeMarketKeeper>,
        accounts: Arc<dyn AccountOps>,
        bank: Arc<dyn BalanceOps>,
    ) -> Self {
        Self {
            keeper,
            accounts,
            bank,
            fee_grant: None,
            fallback: None,
        }
    }

    pub fn with_fee_grant(mut self, fee_grant: Arc<dyn FeeGrantOps>) -> Self {
        self.fee_grant = Some(fee_grant);
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn AnteDecorator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Move the full fee from the payer (or granter) into the module account
    fn escrow(&self, env: &mut HostEnv, fee_tx: &dyn FeeTx, fee: &Coin) -> Result<()> {
        let payer = fee_tx.fee_payer();
        let mut deduct_from = payer.clone();

        if let Some(granter) = fee_tx.fee_granter().filter(|g| *g != payer) {
            let fee_grant = self.fee_grant.as_ref().ok_or_else(|| {
                FeeMarketError::InvalidRequest("fee grants are not enabled".to_string())
            })?;
            fee_grant
                .use_granted_fees(granter, payer, std::slice::from_ref(fee), fee_tx.messages())
                .map_err(|e| {
                    e.wrap(format!("{} does not allow to pay fees for {}", granter, payer))
                })?;
            deduct_from = granter.clone();
        }

        if !self.accounts.has_account(&deduct_from) {
            return Err(FeeMarketError::UnknownAddress(format!(
                "fee payer address: {} does not exist",
                deduct_from
            )));
        }

        if !fee.is_zero() {
            self.bank
                .send_to_module(&deduct_from, FEE_COLLECTOR_NAME, std::slice::from_ref(fee))
                .map_err(|e| as_insufficient_funds(e).wrap("failed to escrow fee"))?;
        }

        env.emit_event(fee_event(fee, &deduct_from));
        Ok(())
    }
}

impl AnteDecorator for FeeMarketCheckDecorator {
    #[instrument(skip(self, env, tx), fields(height = env.block_height))]
    fn ante_handle(&self, env: &mut HostEnv, tx: &dyn Tx, simulate: bool) -> Result<()> {
        // genesis transactions carry no fee
        if env.block_height == 0 {
            return Ok(());
        }

        let fee_tx = tx.as_fee_tx().ok_or_else(|| {
            FeeMarketError::InvalidTxShape("transaction must implement the fee interface".to_string())
        })?;

        let gas_limit = fee_tx.gas_limit();
        if !simulate && gas_limit == 0 {
            return Err(FeeMarketError::InvalidGasLimit(
                "must provide positive gas".to_string(),
            ));
        }

        let params = self.keeper.get_params()?;
        if !params.enabled {
            return match &self.fallback {
                Some(fallback) => fallback.ante_handle(env, tx, simulate),
                None => Ok(()),
            };
        }

        let fee = single_fee_coin(fee_tx.fee(), &params.fee_denom, simulate)?;
        let min_gas_price = self.keeper.get_min_gas_price(&fee.denom)?;

        if !simulate {
            check_tx_fee(&min_gas_price, &fee, gas_limit, true)?;
        }

        // priority first: nothing moves if the fee cannot be priced
        let fee_in_base = self.keeper.resolve_to_denom(
            &DecCoin::new(fee.denom.clone(), fee.amount_dec_saturating()),
            &params.fee_denom,
        )?;
        let base_gas_price = self.keeper.get_base_gas_price()?;
        let priority = get_tx_priority(
            fee_in_base.amount,
            gas_limit,
            base_gas_price,
            self.keeper.config().priority_scale,
        );

        self.escrow(env, fee_tx, &fee)?;

        debug!(
            fee = %fee,
            gas_limit,
            min_gas_price = %min_gas_price,
            priority,
            "Fee escrowed"
        );

        env.min_gas_prices = vec![min_gas_price];
        env.priority = priority;
        Ok(())
    }
}

/// Exactly one fee coin, or a zero coin in `fee_denom` when simulating
/// without a fee
pub(crate) fn single_fee_coin(fee: &[Coin], fee_denom: &str, simulate: bool) -> Result<Coin> {
    match fee {
        [] if simulate => Ok(Coin::zero(fee_denom)),
        [] => Err(FeeMarketError::NoFeeCoins(format!(
            "got length {}",
            fee.len()
        ))),
        [coin] => Ok(coin.clone()),
        _ => Err(FeeMarketError::TooManyFeeCoins(format!(
            "got {}",
            coins_to_string(fee)
        ))),
    }
}

/// Priority of a tx paying `fee` (in the fee denom) for `gas_limit` gas:
/// `floor(fee / gas_limit / base_gas_price × scale)`, clamped to
/// `[0, i64::MAX]`.
pub fn get_tx_priority(fee: Decimal, gas_limit: u64, base_gas_price: Decimal, scale: i64) -> i64 {
    if gas_limit == 0 {
        return 0;
    }
    if base_gas_price.is_zero() {
        return clamp_priority(fee.trunc());
    }

    let scaled = fee
        .checked_div(Decimal::from(gas_limit))
        .and_then(|price| price.checked_div(base_gas_price))
        .and_then(|ratio| ratio.checked_mul(Decimal::from(scale)));

    match scaled {
        Some(value) => clamp_priority(value.floor()),
        None => i64::MAX,
    }
}

fn clamp_priority(value: Decimal) -> i64 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.to_i64().unwrap_or(i64::MAX)
}

fn as_insufficient_funds(err: FeeMarketError) -> FeeMarketError {
    if err.is_kind(&FeeMarketError::InsufficientFunds(String::new())) {
        err
    } else {
        FeeMarketError::InsufficientFunds(err.to_string())
    }
}

fn fee_event(fee: &Coin, payer: &Address) -> Event {
    Event::new(events::EVENT_TYPE_TX)
        .with_attribute(events::ATTRIBUTE_KEY_FEE, fee.to_string())
        .with_attribute(events::ATTRIBUTE_KEY_FEE_PAYER, payer.to_string())
}
