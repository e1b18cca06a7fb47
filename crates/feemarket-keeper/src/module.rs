//! Module wiring for the host application

use feemarket_common::{GenesisState, Result, MODULE_NAME};
use std::sync::Arc;
use tracing::instrument;

use crate::ante::FeeMarketCheckDecorator;
use crate::env::HostEnv;
use crate::expected_keepers::{AccountOps, BalanceOps};
use crate::keeper::FeeMarketKeeper;
use crate::msg_server::MsgServer;
use crate::post::FeeMarketDeductDecorator;
use crate::query_server::QueryServer;

/// Fee market module as registered with the host
pub struct FeeMarketModule {
    keeper: Arc<FeeMarketKeeper>,
}

impl FeeMarketModule {
    pub fn new(keeper: Arc<FeeMarketKeeper>) -> Self {
        Self { keeper }
    }

    pub fn name(&self) -> &'static str {
        MODULE_NAME
    }

    pub fn keeper(&self) -> &Arc<FeeMarketKeeper> {
        &self.keeper
    }

    pub fn msg_server(&self) -> MsgServer {
        MsgServer::new(self.keeper.clone())
    }

    pub fn query_server(&self) -> QueryServer {
        QueryServer::new(self.keeper.clone())
    }

    /// Pre-phase decorator wired to the given collaborators
    pub fn ante_decorator(
        &self,
        accounts: Arc<dyn AccountOps>,
        bank: Arc<dyn BalanceOps>,
    ) -> FeeMarketCheckDecorator {
        FeeMarketCheckDecorator::new(self.keeper.clone(), accounts, bank)
    }

    /// Post-phase decorator wired to the given bank
    pub fn post_decorator(&self, bank: Arc<dyn BalanceOps>) -> FeeMarketDeductDecorator {
        FeeMarketDeductDecorator::new(self.keeper.clone(), bank)
    }

    /// Genesis from JSON, falling back to the classic preset when empty
    pub fn init_genesis_json(&self, bytes: &[u8]) -> Result<()> {
        let genesis = if bytes.iter().all(u8::is_ascii_whitespace) {
            GenesisState::default()
        } else {
            GenesisState::from_json(bytes)?
        };
        self.keeper.init_genesis(&genesis)
    }

    pub fn export_genesis_json(&self) -> Result<String> {
        self.keeper.export_genesis()?.to_json()
    }

    /// End-block hook: run the controller once
    #[instrument(skip(self, env), fields(height = env.block_height))]
    pub fn end_block(&self, env: &HostEnv) -> Result<()> {
        self.keeper.update_fee_market(env)
    }
}
