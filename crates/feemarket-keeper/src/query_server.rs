//! Read-only queries

use feemarket_common::{DecCoin, FeeMarketError, Params, Result, State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use crate::keeper::FeeMarketKeeper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsResponse {
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    pub state: State,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPriceResponse {
    pub price: DecCoin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPricesResponse {
    pub prices: Vec<DecCoin>,
}

/// Query handler of the fee market
pub struct QueryServer {
    keeper: Arc<FeeMarketKeeper>,
}

impl QueryServer {
    pub fn new(keeper: Arc<FeeMarketKeeper>) -> Self {
        Self { keeper }
    }

    #[instrument(skip(self))]
    pub fn params(&self) -> Result<ParamsResponse> {
        Ok(ParamsResponse {
            params: self.keeper.get_params()?,
        })
    }

    #[instrument(skip(self))]
    pub fn state(&self) -> Result<StateResponse> {
        Ok(StateResponse {
            state: self.keeper.get_state()?,
        })
    }

    #[instrument(skip(self))]
    pub fn gas_price(&self, denom: &str) -> Result<GasPriceResponse> {
        if denom.trim().is_empty() {
            return Err(FeeMarketError::InvalidRequest("denom cannot be empty".to_string()));
        }
        Ok(GasPriceResponse {
            price: self.keeper.get_min_gas_price(denom)?,
        })
    }

    #[instrument(skip(self))]
    pub fn gas_prices(&self) -> Result<GasPricesResponse> {
        Ok(GasPricesResponse {
            prices: self.keeper.get_min_gas_prices()?,
        })
    }
}
