//! Controller state: the utilization window and the AIMD price controller
//!
//! The window is a flat ring of per-block gas totals plus a write index.
//! Per-tx gas enters through [`State::update`]; at end block the controller
//! runs [`State::update_learning_rate`], then [`State::update_base_gas_price`],
//! then [`State::increment_height`] advances the ring.
//!
//! Price and learning rate arithmetic saturates: any overflow resets the
//! value to its configured floor instead of failing.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::params::Params;
use crate::error::{FeeMarketError, Result};

/// Mutable fee market state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Current per-gas price in the fee denom
    pub base_gas_price: Decimal,
    /// Current learning rate
    pub learning_rate: Decimal,
    /// Gas consumed per block, one slot per block
    pub window: Vec<u64>,
    /// Slot receiving the current block's gas
    pub index: u64,
}

impl State {
    /// Fresh state with a zeroed window of `window_size` slots
    pub fn new(window_size: u64, base_gas_price: Decimal, learning_rate: Decimal) -> Self {
        Self {
            base_gas_price,
            learning_rate,
            window: vec![0; window_size as usize],
            index: 0,
        }
    }

    /// State matching [`Params::default_eip1559`]
    pub fn default_eip1559() -> Self {
        Self::new(1, Decimal::ONE, dec!(0.125))
    }

    /// State matching [`Params::default_aimd`]
    pub fn default_aimd() -> Self {
        Self::new(8, Decimal::ONE, dec!(0.125))
    }

    /// Gas recorded for the current block
    pub fn current_block_utilization(&self) -> u64 {
        self.window.get(self.index as usize).copied().unwrap_or(0)
    }

    /// Add `gas` to the current block's slot.
    ///
    /// Fails with `BlockUtilizationOverflow` if the slot would exceed the
    /// per-block ceiling; the slot is left untouched in that case.
    pub fn update(&mut self, gas: u64, params: &Params) -> Result<()> {
        let max = params.max_block_utilization;
        let (index, len) = (self.index, self.window.len());
        let slot = self.window.get_mut(index as usize).ok_or_else(|| {
            FeeMarketError::InvalidState(format!(
                "index {} out of range for window of {}",
                index, len
            ))
        })?;

        let next = slot
            .checked_add(gas)
            .filter(|total| *total <= max)
            .ok_or_else(|| {
                FeeMarketError::BlockUtilizationOverflow(format!(
                    "block utilization of {} + {} exceeds max of {}",
                    slot, gas, max
                ))
            })?;

        *slot = next;
        Ok(())
    }

    /// Advance the ring by one block and clear the new slot
    pub fn increment_height(&mut self) {
        if self.window.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.window.len() as u64;
        self.window[self.index as usize] = 0;
    }

    /// Σ (window[i] − target), signed
    pub fn net_utilization(&self, params: &Params) -> i128 {
        let target = i128::from(params.target_block_utilization());
        self.window
            .iter()
            .map(|gas| i128::from(*gas) - target)
            .sum()
    }

    /// Σ window[i] / (len × max_block_utilization).
    ///
    /// `None` when the ratio cannot be represented.
    pub fn average_utilization(&self, params: &Params) -> Option<Decimal> {
        let total: u128 = self.window.iter().map(|gas| u128::from(*gas)).sum();
        let total = Decimal::try_from_i128_with_scale(i128::try_from(total).ok()?, 0).ok()?;
        let capacity = Decimal::from(params.max_block_utilization)
            .checked_mul(Decimal::from(self.window.len() as u64))?;
        if capacity.is_zero() {
            return None;
        }
        total.checked_div(capacity)
    }

    /// AIMD step: additive increase when the window is stressed at either
    /// end, multiplicative decrease otherwise. Returns the new rate.
    pub fn update_learning_rate(&mut self, params: &Params) -> Decimal {
        let next = self.average_utilization(params).and_then(|utilization| {
            if utilization <= params.gamma || utilization >= Decimal::ONE - params.gamma {
                self.learning_rate
                    .checked_add(params.alpha)
                    .map(|lr| lr.min(params.max_learning_rate))
            } else {
                self.learning_rate
                    .checked_mul(params.beta)
                    .map(|lr| lr.max(params.min_learning_rate))
            }
        });

        self.learning_rate = match next {
            Some(lr) => lr,
            None => {
                warn!(
                    learning_rate = %self.learning_rate,
                    "learning rate update overflowed, resetting to minimum"
                );
                params.min_learning_rate
            }
        };
        self.learning_rate
    }

    /// Price step using the current learning rate:
    /// `price × (1 + lr × (s − T) / T) + net × delta`, floored at the
    /// minimum base gas price. Returns the new price.
    pub fn update_base_gas_price(&mut self, params: &Params) -> Decimal {
        let next = self.next_base_gas_price(params);

        self.base_gas_price = match next {
            Some(price) if price < params.min_base_gas_price => params.min_base_gas_price,
            Some(price) => price,
            None => {
                warn!(
                    base_gas_price = %self.base_gas_price,
                    "base gas price update overflowed, resetting to minimum"
                );
                params.min_base_gas_price
            }
        };
        self.base_gas_price
    }

    fn next_base_gas_price(&self, params: &Params) -> Option<Decimal> {
        let target = i128::from(params.target_block_utilization());
        if target == 0 {
            return None;
        }
        let current = i128::from(self.current_block_utilization());

        let error = Decimal::try_from_i128_with_scale(current - target, 0)
            .ok()?
            .checked_div(Decimal::try_from_i128_with_scale(target, 0).ok()?)?;
        let adjustment = Decimal::ONE.checked_add(self.learning_rate.checked_mul(error)?)?;

        let net = Decimal::try_from_i128_with_scale(self.net_utilization(params), 0).ok()?;
        let nudge = net.checked_mul(params.delta)?;

        self.base_gas_price
            .checked_mul(adjustment)?
            .checked_add(nudge)
    }

    /// Stateless validation
    pub fn validate_basic(&self) -> Result<()> {
        if self.window.is_empty() {
            return Err(FeeMarketError::InvalidState("window cannot be empty".to_string()));
        }
        if self.base_gas_price <= Decimal::ZERO {
            return Err(FeeMarketError::InvalidState(
                "base gas price must be positive".to_string(),
            ));
        }
        if self.learning_rate < Decimal::ZERO {
            return Err(FeeMarketError::InvalidState(
                "learning rate cannot be negative".to_string(),
            ));
        }
        if self.index as usize >= self.window.len() {
            return Err(FeeMarketError::InvalidState(format!(
                "index {} out of range for window of {}",
                self.index,
                self.window.len()
            )));
        }
        Ok(())
    }
}

impl Default for State {
    fn default() -> Self {
        Self::default_eip1559()
    }
}
