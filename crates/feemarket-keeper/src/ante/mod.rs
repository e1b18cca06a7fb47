//! Pre-execution fee handling

pub mod fee;

use feemarket_common::Result;

use crate::env::HostEnv;
use crate::tx::Tx;

pub use fee::{get_tx_priority, FeeMarketCheckDecorator};

/// Pre-execution step of the host's transaction pipeline.
///
/// Returning `Ok` hands the transaction to the next step.
#[cfg_attr(test, mockall::automock)]
pub trait AnteDecorator: Send + Sync {
    fn ante_handle(&self, env: &mut HostEnv, tx: &dyn Tx, simulate: bool) -> Result<()>;
}
