//! Fee market query binary
//!
//! Opens a persisted store snapshot (or bootstraps one from genesis) and
//! answers the module's read-only queries.

mod config;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feemarket_common::{DecCoin, Params, State, VERSION};
use feemarket_keeper::{FeeMarketConfig, FeeMarketKeeper, FeeMarketModule, MemStore};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{CliConfig, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "feemarket")]
#[command(about = "Query the AIMD EIP-1559 fee market", version)]
struct Cli {
    /// Directory holding the store snapshot
    #[arg(long, global = true)]
    home: Option<PathBuf>,
    /// Snapshot file name inside the home directory
    #[arg(long, global = true)]
    snapshot: Option<String>,
    /// Genesis file used when no snapshot exists
    #[arg(long, global = true)]
    genesis: Option<PathBuf>,
    /// Output format
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a store snapshot from the genesis file
    Init,
    /// Current parameters
    Params,
    /// Current controller state
    State,
    /// Minimum gas price in one denom
    GasPrice {
        /// Denom to price gas in
        denom: String,
    },
    /// Minimum gas prices in every supported denom
    GasPrices,
}

impl Cli {
    /// Flags win over configuration
    fn apply(&self, mut cfg: CliConfig) -> CliConfig {
        if let Some(home) = &self.home {
            cfg.home = home.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            cfg.snapshot = snapshot.clone();
        }
        if let Some(genesis) = &self.genesis {
            cfg.genesis = Some(genesis.clone());
        }
        if let Some(output) = self.output {
            cfg.output = output;
        }
        cfg
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = cli.apply(CliConfig::load()?);
    debug!(?cfg, "Loaded configuration");

    println!("{}", run(&cli.command, &cfg)?);
    Ok(())
}

fn run(command: &Command, cfg: &CliConfig) -> Result<String> {
    match command {
        Command::Init => init(cfg),
        Command::Params => {
            let resp = open_module(cfg)?.query_server().params()?;
            render(cfg.output, &resp, || params_text(&resp.params))
        }
        Command::State => {
            let resp = open_module(cfg)?.query_server().state()?;
            render(cfg.output, &resp, || state_text(&resp.state))
        }
        Command::GasPrice { denom } => {
            let resp = open_module(cfg)?.query_server().gas_price(denom)?;
            render(cfg.output, &resp, || resp.price.to_string())
        }
        Command::GasPrices => {
            let resp = open_module(cfg)?.query_server().gas_prices()?;
            render(cfg.output, &resp, || coins_text(&resp.prices))
        }
    }
}

/// Bootstrap a snapshot from genesis and persist it under `home`
fn init(cfg: &CliConfig) -> Result<String> {
    let path = cfg.snapshot_path();
    if path.exists() {
        anyhow::bail!("snapshot already exists at {}", path.display());
    }

    let store = Arc::new(MemStore::new());
    bootstrap(store.clone(), cfg)?;

    fs::create_dir_all(&cfg.home)
        .with_context(|| format!("creating home directory {}", cfg.home.display()))?;
    store
        .save(&path)
        .with_context(|| format!("writing snapshot {}", path.display()))?;

    info!(path = %path.display(), version = VERSION, "Fee market store initialized");
    Ok(format!("initialized {}", path.display()))
}

/// Module over the persisted snapshot, or a fresh genesis when none exists
fn open_module(cfg: &CliConfig) -> Result<FeeMarketModule> {
    let path = cfg.snapshot_path();
    if path.exists() {
        let store = MemStore::load(&path)
            .with_context(|| format!("loading snapshot {}", path.display()))?;
        let keeper = FeeMarketKeeper::new(Arc::new(store), FeeMarketConfig::default());
        return Ok(FeeMarketModule::new(Arc::new(keeper)));
    }

    debug!(path = %path.display(), "No snapshot found, bootstrapping from genesis");
    bootstrap(Arc::new(MemStore::new()), cfg)
}

fn bootstrap(store: Arc<MemStore>, cfg: &CliConfig) -> Result<FeeMarketModule> {
    let genesis = match &cfg.genesis {
        Some(path) => {
            fs::read(path).with_context(|| format!("reading genesis {}", path.display()))?
        }
        None => Vec::new(),
    };

    let keeper = FeeMarketKeeper::new(store, FeeMarketConfig::default());
    let module = FeeMarketModule::new(Arc::new(keeper));
    module
        .init_genesis_json(&genesis)
        .context("initializing genesis")?;
    Ok(module)
}

fn render<T, F>(format: OutputFormat, value: &T, text: F) -> Result<String>
where
    T: serde::Serialize,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(text()),
    }
}

fn params_text(p: &Params) -> String {
    [
        format!("alpha: {}", p.alpha),
        format!("beta: {}", p.beta),
        format!("gamma: {}", p.gamma),
        format!("delta: {}", p.delta),
        format!("min_base_gas_price: {}", p.min_base_gas_price),
        format!("min_learning_rate: {}", p.min_learning_rate),
        format!("max_learning_rate: {}", p.max_learning_rate),
        format!("max_block_utilization: {}", p.max_block_utilization),
        format!("window: {}", p.window),
        format!("fee_denom: {}", p.fee_denom),
        format!("enabled: {}", p.enabled),
        format!("distribute_fees: {}", p.distribute_fees),
    ]
    .join("\n")
}

fn state_text(s: &State) -> String {
    let window: Vec<String> = s.window.iter().map(u64::to_string).collect();
    [
        format!("base_gas_price: {}", s.base_gas_price),
        format!("learning_rate: {}", s.learning_rate),
        format!("index: {}", s.index),
        format!("window: [{}]", window.join(", ")),
    ]
    .join("\n")
}

fn coins_text(coins: &[DecCoin]) -> String {
    coins
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
