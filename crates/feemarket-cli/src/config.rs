//! CLI configuration

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "FEEMARKET";

/// Rendering of query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Query CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding the store snapshot
    pub home: PathBuf,
    /// Snapshot file name inside `home`
    pub snapshot: String,
    /// Genesis file used when no snapshot exists
    pub genesis: Option<PathBuf>,
    /// Output format
    pub output: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from(".feemarket"),
            snapshot: "store.json".to_string(),
            genesis: None,
            output: OutputFormat::Json,
        }
    }
}

impl CliConfig {
    /// Load configuration from `.env` and `FEEMARKET_*` variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();
        Self::from_source(None)
    }

    /// Build from an explicit variable map instead of the process environment
    pub fn from_source(vars: Option<config::Map<String, String>>) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(vars))
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.home.join(&self.snapshot)
    }
}
