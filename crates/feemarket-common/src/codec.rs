//! Protobuf encoding of persisted params and state
//!
//! Field tags are fixed; decimals travel as canonical decimal strings.

use prost::Message;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{FeeMarketError, Result};
use crate::types::params::Params;
use crate::types::state::State;

/// Wire form of [`Params`]
#[derive(Clone, PartialEq, Message)]
pub struct ParamsProto {
    #[prost(string, tag = "1")]
    pub alpha: String,
    #[prost(string, tag = "2")]
    pub beta: String,
    #[prost(string, tag = "3")]
    pub gamma: String,
    #[prost(string, tag = "4")]
    pub delta: String,
    #[prost(string, tag = "5")]
    pub min_base_gas_price: String,
    #[prost(string, tag = "6")]
    pub min_learning_rate: String,
    #[prost(string, tag = "7")]
    pub max_learning_rate: String,
    #[prost(uint64, tag = "8")]
    pub max_block_utilization: u64,
    #[prost(uint64, tag = "9")]
    pub window: u64,
    #[prost(string, tag = "10")]
    pub fee_denom: String,
    #[prost(bool, tag = "11")]
    pub enabled: bool,
    #[prost(bool, tag = "12")]
    pub distribute_fees: bool,
}

/// Wire form of [`State`]
#[derive(Clone, PartialEq, Message)]
pub struct StateProto {
    #[prost(string, tag = "1")]
    pub base_gas_price: String,
    #[prost(string, tag = "2")]
    pub learning_rate: String,
    #[prost(uint64, repeated, tag = "3")]
    pub window: Vec<u64>,
    #[prost(uint64, tag = "4")]
    pub index: u64,
}

impl From<&Params> for ParamsProto {
    fn from(p: &Params) -> Self {
        Self {
            alpha: p.alpha.to_string(),
            beta: p.beta.to_string(),
            gamma: p.gamma.to_string(),
            delta: p.delta.to_string(),
            min_base_gas_price: p.min_base_gas_price.to_string(),
            min_learning_rate: p.min_learning_rate.to_string(),
            max_learning_rate: p.max_learning_rate.to_string(),
            max_block_utilization: p.max_block_utilization,
            window: p.window,
            fee_denom: p.fee_denom.clone(),
            enabled: p.enabled,
            distribute_fees: p.distribute_fees,
        }
    }
}

impl TryFrom<ParamsProto> for Params {
    type Error = FeeMarketError;

    fn try_from(p: ParamsProto) -> Result<Self> {
        Ok(Self {
            alpha: parse_dec("alpha", &p.alpha)?,
            beta: parse_dec("beta", &p.beta)?,
            gamma: parse_dec("gamma", &p.gamma)?,
            delta: parse_dec("delta", &p.delta)?,
            min_base_gas_price: parse_dec("min_base_gas_price", &p.min_base_gas_price)?,
            min_learning_rate: parse_dec("min_learning_rate", &p.min_learning_rate)?,
            max_learning_rate: parse_dec("max_learning_rate", &p.max_learning_rate)?,
            max_block_utilization: p.max_block_utilization,
            window: p.window,
            fee_denom: p.fee_denom,
            enabled: p.enabled,
            distribute_fees: p.distribute_fees,
        })
    }
}

impl From<&State> for StateProto {
    fn from(s: &State) -> Self {
        Self {
            base_gas_price: s.base_gas_price.to_string(),
            learning_rate: s.learning_rate.to_string(),
            window: s.window.clone(),
            index: s.index,
        }
    }
}

impl TryFrom<StateProto> for State {
    type Error = FeeMarketError;

    fn try_from(s: StateProto) -> Result<Self> {
        Ok(Self {
            base_gas_price: parse_dec("base_gas_price", &s.base_gas_price)?,
            learning_rate: parse_dec("learning_rate", &s.learning_rate)?,
            window: s.window,
            index: s.index,
        })
    }
}

fn parse_dec(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| FeeMarketError::Codec(format!("invalid decimal for {}: {:?}: {}", field, value, e)))
}

pub fn encode_params(params: &Params) -> Vec<u8> {
    ParamsProto::from(params).encode_to_vec()
}

pub fn decode_params(bytes: &[u8]) -> Result<Params> {
    ParamsProto::decode(bytes)?.try_into()
}

pub fn encode_state(state: &State) -> Vec<u8> {
    StateProto::from(state).encode_to_vec()
}

pub fn decode_state(bytes: &[u8]) -> Result<State> {
    StateProto::decode(bytes)?.try_into()
}
