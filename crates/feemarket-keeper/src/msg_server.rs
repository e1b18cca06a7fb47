//! Authority-gated parameter changes
//!
//! Every accepted change reinitializes the state from the new params, so
//! the window always matches `params.window`.

use feemarket_common::{Address, FeeMarketError, Params, Result, State, NEVER_ENABLED_HEIGHT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::env::HostEnv;
use crate::keeper::FeeMarketKeeper;

/// Replace the fee market params
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgParams {
    pub authority: Address,
    pub params: Params,
}

impl MsgParams {
    pub fn new(authority: Address, params: Params) -> Self {
        Self { authority, params }
    }

    /// Stateless validation
    pub fn validate_basic(&self) -> Result<()> {
        if self.authority.is_empty() {
            return Err(FeeMarketError::Unauthorized("authority cannot be empty".to_string()));
        }
        self.params.validate_basic()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgParamsResponse {}

/// Message handler of the fee market
pub struct MsgServer {
    keeper: Arc<FeeMarketKeeper>,
}

impl MsgServer {
    pub fn new(keeper: Arc<FeeMarketKeeper>) -> Self {
        Self { keeper }
    }

    #[instrument(skip(self, env, msg), fields(height = env.block_height, authority = %msg.authority))]
    pub fn params(&self, env: &HostEnv, msg: MsgParams) -> Result<MsgParamsResponse> {
        if msg.authority != *self.keeper.authority() {
            return Err(FeeMarketError::Unauthorized(format!(
                "invalid authority; expected {}, got {}",
                self.keeper.authority(),
                msg.authority
            )));
        }
        msg.validate_basic()?;

        let current = self.keeper.get_params()?;
        let params = msg.params;

        if !current.enabled && params.enabled {
            self.keeper.set_enabled_height(env.block_height)?;
        } else if current.enabled && !params.enabled {
            self.keeper.set_enabled_height(NEVER_ENABLED_HEIGHT)?;
        }

        self.keeper.set_params(&params)?;
        self.keeper.set_state(&State::new(
            params.window,
            params.min_base_gas_price,
            params.min_learning_rate,
        ))?;

        info!(
            window = params.window,
            enabled = params.enabled,
            distribute_fees = params.distribute_fees,
            "Fee market params updated"
        );
        Ok(MsgParamsResponse {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use crate::FeeMarketConfig;
    use feemarket_common::GenesisState;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn server_with(config: FeeMarketConfig) -> (MsgServer, Arc<FeeMarketKeeper>) {
        let keeper = Arc::new(FeeMarketKeeper::new(Arc::new(MemStore::new()), config));
        (MsgServer::new(keeper.clone()), keeper)
    }

    fn server(genesis: GenesisState) -> (MsgServer, Arc<FeeMarketKeeper>) {
        let (server, keeper) =
            server_with(FeeMarketConfig::default().with_authority(Address::new("gov")));
        keeper.init_genesis(&genesis).unwrap();
        (server, keeper)
    }

    #[test]
    fn test_wrong_authority() {
        let (server, _) = server(GenesisState::default());
        let msg = MsgParams::new(Address::new("mallory"), Params::default_aimd());
        let err = server.params(&HostEnv::new(3), msg).unwrap_err();
        assert!(matches!(err, FeeMarketError::Unauthorized(_)));
        assert_eq!(err.code(), 4);
    }

    #[test]
    fn test_invalid_params() {
        let (server, keeper) = server(GenesisState::default());
        let mut params = Params::default_aimd();
        params.window = 0;
        let err = server
            .params(&HostEnv::new(3), MsgParams::new(Address::new("gov"), params))
            .unwrap_err();
        assert!(matches!(err, FeeMarketError::InvalidParams(_)));
        assert_eq!(keeper.get_params().unwrap(), Params::default());
    }

    #[test]
    fn test_params_change_resets_state() {
        let (server, keeper) = server(GenesisState::default());
        let mut state = keeper.get_state().unwrap();
        state.base_gas_price = dec!(42);
        state.window[0] = 1_000;
        keeper.set_state(&state).unwrap();

        let mut params = Params::default_aimd();
        params.min_base_gas_price = dec!(3);
        server
            .params(&HostEnv::new(3), MsgParams::new(Address::new("gov"), params.clone()))
            .unwrap();

        assert_eq!(keeper.get_params().unwrap(), params);
        let state = keeper.get_state().unwrap();
        assert_eq!(state.window, vec![0; 8]);
        assert_eq!(state.index, 0);
        assert_eq!(state.base_gas_price, dec!(3));
        assert_eq!(state.learning_rate, params.min_learning_rate);
    }

    #[test]
    fn test_enabling_records_height() {
        let mut genesis = GenesisState::default_aimd();
        genesis.params.enabled = false;
        let (server, keeper) = server(genesis);
        assert_eq!(keeper.get_enabled_height().unwrap(), -1);

        server
            .params(
                &HostEnv::new(10),
                MsgParams::new(Address::new("gov"), Params::default_aimd()),
            )
            .unwrap();
        assert_eq!(keeper.get_enabled_height().unwrap(), 10);

        // a cosmetic change keeps the recorded height
        let mut params = Params::default_aimd();
        params.distribute_fees = true;
        server
            .params(&HostEnv::new(11), MsgParams::new(Address::new("gov"), params))
            .unwrap();
        assert_eq!(keeper.get_enabled_height().unwrap(), 10);
    }

    #[test]
    fn test_disabling_clears_height() {
        let (server, keeper) = server(GenesisState::default_aimd());
        keeper.set_enabled_height(4).unwrap();

        let mut params = Params::default_aimd();
        params.enabled = false;
        server
            .params(&HostEnv::new(9), MsgParams::new(Address::new("gov"), params))
            .unwrap();
        assert_eq!(keeper.get_enabled_height().unwrap(), -1);
    }

    #[test]
    fn test_smallest_params_survive_genesis_export() {
        let (server, keeper) = server(GenesisState::default());
        let mut params = Params::default_aimd();
        params.min_base_gas_price = dec!(0.000001);
        params.min_learning_rate = Decimal::ZERO;
        server
            .params(&HostEnv::new(5), MsgParams::new(Address::new("gov"), params))
            .unwrap();

        let exported = keeper.export_genesis().unwrap();
        let (_, fresh) = server_with(FeeMarketConfig::default());
        fresh.init_genesis(&exported).unwrap();
        assert_eq!(fresh.export_genesis().unwrap(), exported);
    }

    #[test]
    fn test_zero_min_price_rejected() {
        let (server, keeper) = server(GenesisState::default());
        let mut params = Params::default_aimd();
        params.min_base_gas_price = Decimal::ZERO;
        let err = server
            .params(&HostEnv::new(5), MsgParams::new(Address::new("gov"), params))
            .unwrap_err();
        assert!(matches!(err, FeeMarketError::InvalidParams(_)));
        assert_eq!(keeper.get_state().unwrap(), State::default());
    }

    #[test]
    fn test_oversized_window_rejected() {
        let (server, keeper) = server(GenesisState::default());
        let mut params = Params::default_aimd();
        params.window = u64::MAX;
        let err = server
            .params(&HostEnv::new(5), MsgParams::new(Address::new("gov"), params))
            .unwrap_err();
        assert!(matches!(err, FeeMarketError::InvalidParams(_)));
        assert_eq!(keeper.get_params().unwrap(), Params::default());
    }

    #[test]
    fn test_validate_basic_empty_authority() {
        let msg = MsgParams::new(Address::default(), Params::default());
        assert!(matches!(msg.validate_basic(), Err(FeeMarketError::Unauthorized(_))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn params_change_always_resets_state(
                window in 1u64..=64,
                min_price_millis in 1i64..=1_000_000,
                min_lr_millis in 0i64..=500,
            ) {
                let (server, keeper) = server(GenesisState::default_aimd());
                let mut params = Params::default_aimd();
                params.window = window;
                params.min_base_gas_price = rust_decimal::Decimal::new(min_price_millis, 3);
                params.min_learning_rate = rust_decimal::Decimal::new(min_lr_millis, 3);
                params.max_learning_rate = params.min_learning_rate.max(params.max_learning_rate);

                server
                    .params(&HostEnv::new(7), MsgParams::new(Address::new("gov"), params.clone()))
                    .unwrap();

                let state = keeper.get_state().unwrap();
                prop_assert_eq!(state.window.len() as u64, window);
                prop_assert!(state.window.iter().all(|s| *s == 0));
                prop_assert_eq!(state.index, 0);
                prop_assert_eq!(state.base_gas_price, params.min_base_gas_price);
                prop_assert_eq!(state.learning_rate, params.min_learning_rate);
            }
        }
    }
}
