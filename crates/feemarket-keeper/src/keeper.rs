//! Fee market keeper
//!
//! Owns the persisted params, state and enabled height, answers gas price
//! queries, and drives the AIMD controller once per block.

use feemarket_common::{
    codec, Address, DecCoin, FeeMarketError, GenesisState, Params, Result, State,
    KEY_ENABLED_HEIGHT, KEY_PARAMS, KEY_STATE, NEVER_ENABLED_HEIGHT,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::env::HostEnv;
use crate::expected_keepers::DenomResolver;
use crate::store::KvStore;
use crate::FeeMarketConfig;

/// Fee market keeper
pub struct FeeMarketKeeper {
    store: Arc<dyn KvStore>,
    config: FeeMarketConfig,
    resolver: RwLock<Option<Arc<dyn DenomResolver>>>,
}

impl FeeMarketKeeper {
    pub fn new(store: Arc<dyn KvStore>, config: FeeMarketConfig) -> Self {
        Self {
            store,
            config,
            resolver: RwLock::new(None),
        }
    }

    /// Install the denomination resolver
    pub fn set_denom_resolver(&self, resolver: Arc<dyn DenomResolver>) {
        *self.resolver.write() = Some(resolver);
    }

    /// Identity allowed to change params
    pub fn authority(&self) -> &Address {
        &self.config.authority
    }

    pub fn config(&self) -> &FeeMarketConfig {
        &self.config
    }

    pub fn get_params(&self) -> Result<Params> {
        let bytes = self
            .store
            .get(KEY_PARAMS)?
            .ok_or_else(|| FeeMarketError::Store("params not found".to_string()))?;
        codec::decode_params(&bytes)
    }

    /// Persist already-validated params
    pub fn set_params(&self, params: &Params) -> Result<()> {
        self.store.set(KEY_PARAMS, codec::encode_params(params))
    }

    pub fn get_state(&self) -> Result<State> {
        let bytes = self
            .store
            .get(KEY_STATE)?
            .ok_or_else(|| FeeMarketError::Store("state not found".to_string()))?;
        codec::decode_state(&bytes)
    }

    pub fn set_state(&self, state: &State) -> Result<()> {
        self.store.set(KEY_STATE, codec::encode_state(state))
    }

    /// Height the market was last enabled at, `-1` if never
    pub fn get_enabled_height(&self) -> Result<i64> {
        match self.store.get(KEY_ENABLED_HEIGHT)? {
            None => Ok(NEVER_ENABLED_HEIGHT),
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| FeeMarketError::Codec(format!("enabled height: {}", e)))?;
                text.parse::<i64>().map_err(|e| {
                    FeeMarketError::Codec(format!("enabled height {:?}: {}", text, e))
                })
            }
        }
    }

    pub fn set_enabled_height(&self, height: i64) -> Result<()> {
        self.store
            .set(KEY_ENABLED_HEIGHT, height.to_string().into_bytes())
    }

    pub fn get_base_gas_price(&self) -> Result<Decimal> {
        Ok(self.get_state()?.base_gas_price)
    }

    pub fn get_learning_rate(&self) -> Result<Decimal> {
        Ok(self.get_state()?.learning_rate)
    }

    /// Express `coin` in `denom`, delegating non-identity conversions to
    /// the resolver
    pub fn resolve_to_denom(&self, coin: &DecCoin, denom: &str) -> Result<DecCoin> {
        if coin.denom == denom {
            return Ok(coin.clone());
        }
        let resolver = self.resolver.read().clone().ok_or_else(|| {
            FeeMarketError::ResolverNotSet(format!(
                "cannot convert {} to {}",
                coin.denom, denom
            ))
        })?;
        resolver.convert_to_denom(coin, denom)
    }

    /// Base gas price expressed in `denom`
    pub fn get_min_gas_price(&self, denom: &str) -> Result<DecCoin> {
        let params = self.get_params()?;
        let state = self.get_state()?;
        let base = DecCoin::new(params.fee_denom, state.base_gas_price);
        self.resolve_to_denom(&base, denom)
    }

    /// Base gas price plus its conversion to every extra denom the resolver
    /// advertises. Individual conversion failures are skipped.
    pub fn get_min_gas_prices(&self) -> Result<Vec<DecCoin>> {
        let params = self.get_params()?;
        let state = self.get_state()?;
        let base = DecCoin::new(params.fee_denom.clone(), state.base_gas_price);

        let mut prices = vec![base.clone()];
        let resolver = self.resolver.read().clone();
        if let Some(resolver) = resolver {
            let extra = match resolver.extra_denoms() {
                Ok(denoms) => denoms,
                Err(e) => {
                    info!(error = %e, "failed to list extra denoms");
                    Vec::new()
                }
            };
            for denom in extra.iter().filter(|d| **d != params.fee_denom) {
                match resolver.convert_to_denom(&base, denom) {
                    Ok(price) => prices.push(price),
                    Err(e) => info!(denom = %denom, error = %e, "failed to convert gas price"),
                }
            }
        }

        prices.sort_by(|a, b| a.denom.cmp(&b.denom));
        prices.dedup_by(|a, b| a.denom == b.denom);
        Ok(prices)
    }

    /// End-block controller: update the learning rate, then the base gas
    /// price, then advance the window. No-op while the market is disabled.
    #[instrument(skip(self, env), fields(height = env.block_height))]
    pub fn update_fee_market(&self, env: &HostEnv) -> Result<()> {
        let params = self.get_params()?;
        if !params.enabled {
            debug!("fee market disabled, skipping controller update");
            return Ok(());
        }

        let mut state = self.get_state()?;
        let average = state.average_utilization(&params);
        let net = state.net_utilization(&params);

        let new_learning_rate = state.update_learning_rate(&params);
        let new_base_gas_price = state.update_base_gas_price(&params);

        info!(
            height = env.block_height,
            new_base_gas_price = %new_base_gas_price,
            new_learning_rate = %new_learning_rate,
            average_block_utilization = %average.unwrap_or_default(),
            net_block_utilization = net,
            "Updated fee market"
        );

        state.increment_height();
        self.set_state(&state)
    }

    /// Load and validate genesis; the enabled height starts as never enabled
    #[instrument(skip(self, genesis))]
    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<()> {
        genesis.validate()?;
        self.set_params(&genesis.params)?;
        self.set_state(&genesis.state)?;
        self.set_enabled_height(NEVER_ENABLED_HEIGHT)?;
        info!(
            window = genesis.params.window,
            fee_denom = %genesis.params.fee_denom,
            enabled = genesis.params.enabled,
            "Fee market genesis initialized"
        );
        Ok(())
    }

    pub fn export_genesis(&self) -> Result<GenesisState> {
        Ok(GenesisState::new(self.get_params()?, self.get_state()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expected_keepers::MockDenomResolver;
    use crate::store::MemStore;
    use rust_decimal_macros::dec;

    fn keeper_with(genesis: GenesisState) -> FeeMarketKeeper {
        let keeper = FeeMarketKeeper::new(Arc::new(MemStore::new()), FeeMarketConfig::default());
        keeper.init_genesis(&genesis).unwrap();
        keeper
    }

    #[test]
    fn test_missing_params_is_store_error() {
        let keeper = FeeMarketKeeper::new(Arc::new(MemStore::new()), FeeMarketConfig::default());
        assert!(matches!(keeper.get_params(), Err(FeeMarketError::Store(_))));
        assert_eq!(keeper.get_enabled_height().unwrap(), -1);
    }

    #[test]
    fn test_genesis_round_trip() {
        let keeper = keeper_with(GenesisState::default_aimd());
        assert_eq!(keeper.export_genesis().unwrap(), GenesisState::default_aimd());
        assert_eq!(keeper.get_enabled_height().unwrap(), NEVER_ENABLED_HEIGHT);
    }

    #[test]
    fn test_invalid_genesis_rejected() {
        let keeper = FeeMarketKeeper::new(Arc::new(MemStore::new()), FeeMarketConfig::default());
        let genesis = GenesisState::new(Params::default_aimd(), State::default_eip1559());
        assert!(matches!(
            keeper.init_genesis(&genesis),
            Err(FeeMarketError::InvalidGenesis(_))
        ));
        assert!(keeper.get_params().is_err());
    }

    #[test]
    fn test_enabled_height_round_trip() {
        let keeper = keeper_with(GenesisState::default());
        keeper.set_enabled_height(42).unwrap();
        assert_eq!(keeper.get_enabled_height().unwrap(), 42);
    }

    #[test]
    fn test_min_gas_price_native_denom() {
        let keeper = keeper_with(GenesisState::default_aimd());
        let price = keeper.get_min_gas_price("stake").unwrap();
        assert_eq!(price, DecCoin::new("stake", Decimal::ONE));
    }

    #[test]
    fn test_min_gas_price_without_resolver() {
        let keeper = keeper_with(GenesisState::default_aimd());
        let err = keeper.get_min_gas_price("atom").unwrap_err();
        assert!(matches!(err, FeeMarketError::ResolverNotSet(_)));
    }

    #[test]
    fn test_min_gas_price_via_resolver() {
        let keeper = keeper_with(GenesisState::default_aimd());
        let mut resolver = MockDenomResolver::new();
        resolver
            .expect_convert_to_denom()
            .withf(|coin, denom| coin.denom == "stake" && denom == "atom")
            .returning(|coin, denom| Ok(DecCoin::new(denom, coin.amount * dec!(2))));
        keeper.set_denom_resolver(Arc::new(resolver));

        let price = keeper.get_min_gas_price("atom").unwrap();
        assert_eq!(price, DecCoin::new("atom", dec!(2)));
    }

    #[test]
    fn test_min_gas_prices_skips_failures_and_sorts() {
        let keeper = keeper_with(GenesisState::default_aimd());
        let mut resolver = MockDenomResolver::new();
        resolver
            .expect_extra_denoms()
            .returning(|| Ok(vec!["uusdc".to_string(), "broken".to_string(), "atom".to_string()]));
        resolver.expect_convert_to_denom().returning(|coin, denom| {
            if denom == "broken" {
                Err(FeeMarketError::InvalidRequest("no route".to_string()))
            } else {
                Ok(DecCoin::new(denom, coin.amount))
            }
        });
        keeper.set_denom_resolver(Arc::new(resolver));

        let denoms: Vec<_> = keeper
            .get_min_gas_prices()
            .unwrap()
            .into_iter()
            .map(|p| p.denom)
            .collect();
        assert_eq!(denoms, vec!["atom", "stake", "uusdc"]);
    }

    #[test]
    fn test_min_gas_prices_without_resolver() {
        let keeper = keeper_with(GenesisState::default_aimd());
        let prices = keeper.get_min_gas_prices().unwrap();
        assert_eq!(prices, vec![DecCoin::new("stake", Decimal::ONE)]);
    }

    #[test]
    fn test_update_fee_market_advances_window() {
        let keeper = keeper_with(GenesisState::default_aimd());
        let mut state = keeper.get_state().unwrap();
        state.window[0] = 1_000;
        keeper.set_state(&state).unwrap();

        keeper.update_fee_market(&HostEnv::new(1)).unwrap();

        let state = keeper.get_state().unwrap();
        assert_eq!(state.index, 1);
        assert_eq!(state.window[0], 1_000);
        assert_eq!(state.window[1], 0);
        assert_eq!(state.learning_rate, dec!(0.15));
        assert_eq!(state.base_gas_price, Decimal::ONE);
    }

    #[test]
    fn test_update_fee_market_disabled_is_noop() {
        let mut genesis = GenesisState::default_aimd();
        genesis.params.enabled = false;
        let keeper = keeper_with(genesis.clone());

        keeper.update_fee_market(&HostEnv::new(1)).unwrap();
        assert_eq!(keeper.get_state().unwrap(), genesis.state);
    }
}
