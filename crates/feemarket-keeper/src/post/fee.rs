//! Post-phase fee decorator
//!
//! Re-prices the escrowed fee against the gas actually consumed, settles
//! the owed part, tips the block proposer with the rest, and records the
//! consumed gas into the utilization window.

use feemarket_common::{
    events, Coin, DecCoin, Event, FeeMarketError, Result, FEE_COLLECTOR_NAME,
    HOST_FEE_COLLECTOR_NAME,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::PostDecorator;
use crate::ante::fee::single_fee_coin;
use crate::env::HostEnv;
use crate::expected_keepers::BalanceOps;
use crate::keeper::FeeMarketKeeper;
use crate::tx::Tx;

/// Split of a provided fee into the owed part and the proposer tip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSplit {
    pub pay: Coin,
    pub tip: Option<Coin>,
}

/// Check `fee` covers `ceil(min_gas_price × gas)` and split it.
///
/// In the pre-phase `gas` is the gas limit; in the post-phase it is the
/// gas consumed, and a shortfall means the pre-phase check was bypassed.
pub fn check_tx_fee(min_gas_price: &DecCoin, fee: &Coin, gas: u64, is_ante: bool) -> Result<FeeSplit> {
    if min_gas_price.denom != fee.denom {
        return Err(FeeMarketError::InvalidRequest(format!(
            "fee denom {} does not match gas price denom {}",
            fee.denom, min_gas_price.denom
        )));
    }

    let required = min_gas_price
        .amount
        .checked_mul(Decimal::from(gas))
        .ok_or_else(|| {
            FeeMarketError::InsufficientFee(format!(
                "required fee overflows for gas price {} and gas {}",
                min_gas_price, gas
            ))
        })?;
    let required = DecCoin::new(fee.denom.clone(), required).ceil_to_coin()?;

    if !fee.is_gte(&required)? {
        let phase = if is_ante { "gas limit" } else { "gas consumed" };
        return Err(FeeMarketError::InsufficientFee(format!(
            "got: {} required: {}, min gas price: {}, {}: {}",
            fee, required, min_gas_price, phase, gas
        )));
    }

    let tip = fee.checked_sub(&required)?;
    Ok(FeeSplit {
        pay: required,
        tip: (!tip.is_zero()).then_some(tip),
    })
}

/// Post-phase decorator of the fee market
pub struct FeeMarketDeductDecorator {
    keeper: Arc<FeeMarketKeeper>,
    bank: Arc<dyn BalanceOps>,
}

impl FeeMarketDeductDecorator {
    pub fn new(keeper: Arc<FeeMarketKeeper>, bank: Arc<dyn BalanceOps>) -> Self {
        Self { keeper, bank }
    }

    /// Forward the owed fee to the host fee collector, or leave it in the
    /// module account when fees are not distributed
    fn deduct_coins(&self, env: &mut HostEnv, pay: &Coin, distribute_fees: bool) -> Result<()> {
        if distribute_fees && !pay.is_zero() {
            self.bank
                .send_module_to_module(
                    FEE_COLLECTOR_NAME,
                    HOST_FEE_COLLECTOR_NAME,
                    std::slice::from_ref(pay),
                )
                .map_err(|e| e.wrap("failed to distribute fees"))?;
        }

        env.emit_event(
            Event::new(events::EVENT_TYPE_FEE_PAY)
                .with_attribute(events::ATTRIBUTE_KEY_FEE, pay.to_string()),
        );
        Ok(())
    }

    /// Pay the tip from the module account to the block proposer
    fn send_tip(&self, env: &mut HostEnv, tip: &Coin) -> Result<()> {
        let proposer = env.proposer.clone().ok_or_else(|| {
            FeeMarketError::UnknownAddress("block proposer is not set".to_string())
        })?;

        self.bank
            .send_module_to_account(FEE_COLLECTOR_NAME, &proposer, std::slice::from_ref(tip))
            .map_err(|e| e.wrap("failed to send tip to proposer"))?;

        env.emit_event(
            Event::new(events::EVENT_TYPE_TIP_PAY)
                .with_attribute(events::ATTRIBUTE_KEY_TIP, tip.to_string())
                .with_attribute(events::ATTRIBUTE_KEY_TIP_PAYEE, proposer.to_string()),
        );
        Ok(())
    }
}

impl PostDecorator for FeeMarketDeductDecorator {
    #[instrument(skip(self, env, tx), fields(height = env.block_height))]
    fn post_handle(&self, env: &mut HostEnv, tx: &dyn Tx, simulate: bool) -> Result<()> {
        if env.block_height == 0 {
            return Ok(());
        }

        let fee_tx = tx.as_fee_tx().ok_or_else(|| {
            FeeMarketError::InvalidTxShape("transaction must implement the fee interface".to_string())
        })?;

        if !simulate && fee_tx.gas_limit() == 0 {
            return Err(FeeMarketError::InvalidGasLimit(
                "must provide positive gas".to_string(),
            ));
        }

        let params = self.keeper.get_params()?;
        if !params.enabled {
            return Ok(());
        }

        // the block that enabled the market was pre-phased under the old regime
        let enabled_height = self.keeper.get_enabled_height()?;
        if env.block_height <= enabled_height {
            debug!(enabled_height, "fee market enabled this block, skipping deduction");
            return Ok(());
        }

        let fee = single_fee_coin(fee_tx.fee(), &params.fee_denom, simulate)?;
        let gas_consumed = env.gas_meter.gas_consumed();
        let min_gas_price = self.keeper.get_min_gas_price(&fee.denom)?;

        // simulated fees may be short of the consumed gas; charge what was given
        let split = match check_tx_fee(&min_gas_price, &fee, gas_consumed, false) {
            Ok(split) => split,
            Err(e) if simulate => {
                debug!(error = %e, "simulated fee below consumed gas, paying it in full");
                FeeSplit {
                    pay: fee.clone(),
                    tip: None,
                }
            }
            Err(e) => return Err(e),
        };

        debug!(
            min_gas_price = %min_gas_price,
            gas_consumed,
            fee = %fee,
            pay = %split.pay,
            tip = ?split.tip.as_ref().map(|t| t.to_string()),
            "Settling fee"
        );

        self.deduct_coins(env, &split.pay, params.distribute_fees)?;
        if let Some(tip) = &split.tip {
            self.send_tip(env, tip)?;
        }

        let mut state = self.keeper.get_state()?;
        state.update(gas_consumed, &params)?;
        self.keeper.set_state(&state)?;

        if simulate {
            env.gas_meter
                .consume_gas(self.keeper.config().simulation_send_gas, "simulation send gas");
        }

        Ok(())
    }
}
