//! Genesis state

use serde::{Deserialize, Serialize};

use super::params::Params;
use super::state::State;
use crate::error::{FeeMarketError, Result};

/// Module state at chain start
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub state: State,
}

impl GenesisState {
    pub fn new(params: Params, state: State) -> Self {
        Self { params, state }
    }

    /// Classic EIP-1559 genesis
    pub fn default_eip1559() -> Self {
        Self::new(Params::default_eip1559(), State::default_eip1559())
    }

    /// AIMD genesis
    pub fn default_aimd() -> Self {
        Self::new(Params::default_aimd(), State::default_aimd())
    }

    /// Validate params, state, and that the window length matches
    pub fn validate(&self) -> Result<()> {
        self.params
            .validate_basic()
            .map_err(|e| FeeMarketError::InvalidGenesis(e.to_string()))?;
        self.state
            .validate_basic()
            .map_err(|e| FeeMarketError::InvalidGenesis(e.to_string()))?;

        if self.state.window.len() as u64 != self.params.window {
            return Err(FeeMarketError::InvalidGenesis(format!(
                "state window length {} does not match params window {}",
                self.state.window.len(),
                self.params.window
            )));
        }
        Ok(())
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let genesis: GenesisState = serde_json::from_slice(bytes)?;
        Ok(genesis)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
