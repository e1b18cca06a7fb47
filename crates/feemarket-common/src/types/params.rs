//! Fee market parameters
//!
//! Parameters are immutable within a block and only change through the
//! authority-gated parameter message. Two presets exist:
//! - [`Params::default_eip1559`]: classic EIP-1559, base price moves by
//!   exactly ±12.5% per fully empty or full block
//! - [`Params::default_aimd`]: AIMD learning rate over an 8 block window

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{FeeMarketError, Result};

/// Default fee denomination
pub const DEFAULT_FEE_DENOM: &str = "stake";

/// Default per-block gas ceiling
pub const DEFAULT_MAX_BLOCK_UTILIZATION: u64 = 30_000_000;

/// Upper bound on the number of blocks in the utilization window
pub const MAX_WINDOW: u64 = 65_536;

/// Fee market parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Additive learning rate step
    pub alpha: Decimal,
    /// Multiplicative learning rate decay, in [0, 1]
    pub beta: Decimal,
    /// Half-width of the stressed band, in [0, 0.5]
    pub gamma: Decimal,
    /// Price nudge per unit of net utilization
    pub delta: Decimal,
    /// Floor of the base gas price
    pub min_base_gas_price: Decimal,
    pub min_learning_rate: Decimal,
    pub max_learning_rate: Decimal,
    /// Gas ceiling per block; the target is exactly half
    pub max_block_utilization: u64,
    /// Ring buffer length in blocks
    pub window: u64,
    /// Denomination the base gas price is expressed in
    pub fee_denom: String,
    /// Whether the controller drives fees
    pub enabled: bool,
    /// Forward fees to the host fee collector instead of soft burning them
    pub distribute_fees: bool,
}

impl Params {
    /// Classic EIP-1559 parameters
    pub fn default_eip1559() -> Self {
        Self {
            alpha: Decimal::ZERO,
            beta: Decimal::ONE,
            gamma: Decimal::ZERO,
            delta: Decimal::ZERO,
            min_base_gas_price: Decimal::ONE,
            min_learning_rate: dec!(0.125),
            max_learning_rate: dec!(0.125),
            max_block_utilization: DEFAULT_MAX_BLOCK_UTILIZATION,
            window: 1,
            fee_denom: DEFAULT_FEE_DENOM.to_string(),
            enabled: true,
            distribute_fees: false,
        }
    }

    /// AIMD parameters
    pub fn default_aimd() -> Self {
        Self {
            alpha: dec!(0.025),
            beta: dec!(0.95),
            gamma: dec!(0.25),
            delta: Decimal::ZERO,
            min_base_gas_price: Decimal::ONE,
            min_learning_rate: dec!(0.125),
            max_learning_rate: dec!(0.5),
            max_block_utilization: DEFAULT_MAX_BLOCK_UTILIZATION,
            window: 8,
            fee_denom: DEFAULT_FEE_DENOM.to_string(),
            enabled: true,
            distribute_fees: false,
        }
    }

    /// Target gas per block
    pub fn target_block_utilization(&self) -> u64 {
        self.max_block_utilization / 2
    }

    /// Stateless validation
    pub fn validate_basic(&self) -> Result<()> {
        if self.window == 0 {
            return Err(invalid("window cannot be zero"));
        }
        if self.window > MAX_WINDOW {
            return Err(FeeMarketError::InvalidParams(format!(
                "window {} exceeds maximum of {}",
                self.window, MAX_WINDOW
            )));
        }
        if self.alpha < Decimal::ZERO {
            return Err(invalid("alpha cannot be negative"));
        }
        if self.beta < Decimal::ZERO || self.beta > Decimal::ONE {
            return Err(invalid("beta must be between 0 and 1"));
        }
        if self.gamma < Decimal::ZERO || self.gamma > dec!(0.5) {
            return Err(invalid("gamma must be between 0 and 0.5"));
        }
        if self.delta < Decimal::ZERO {
            return Err(invalid("delta cannot be negative"));
        }
        if self.min_base_gas_price <= Decimal::ZERO {
            return Err(invalid("min base gas price must be positive"));
        }
        if self.min_learning_rate < Decimal::ZERO {
            return Err(invalid("min learning rate cannot be negative"));
        }
        if self.max_learning_rate < self.min_learning_rate {
            return Err(invalid(
                "min learning rate cannot be greater than max learning rate",
            ));
        }
        if self.max_block_utilization < 2 {
            return Err(invalid("max block utilization must be at least 2"));
        }
        if self.fee_denom.trim().is_empty() {
            return Err(invalid("fee denom must be set"));
        }
        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::default_eip1559()
    }
}

fn invalid(msg: &str) -> FeeMarketError {
    FeeMarketError::InvalidParams(msg.to_string())
}
