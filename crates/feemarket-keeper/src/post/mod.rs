//! Post-execution fee handling

pub mod fee;

use feemarket_common::Result;

use crate::env::HostEnv;
use crate::tx::Tx;

pub use fee::{check_tx_fee, FeeMarketDeductDecorator, FeeSplit};

/// Post-execution step of the host's transaction pipeline
pub trait PostDecorator: Send + Sync {
    fn post_handle(&self, env: &mut HostEnv, tx: &dyn Tx, simulate: bool) -> Result<()>;
}
