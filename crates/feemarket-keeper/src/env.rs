//! Host environment passed explicitly through every operation
//!
//! Carries what the host chain exposes to the module for the transaction
//! or block being processed: height, proposer, gas meter, and the
//! annotations and events the module hands back.

use feemarket_common::{Address, DecCoin, Event};

/// Per-transaction gas accounting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GasMeter {
    consumed: u64,
}

impl GasMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gas_consumed(&self) -> u64 {
        self.consumed
    }

    /// Charge `amount`, saturating at `u64::MAX`
    pub fn consume_gas(&mut self, amount: u64, descriptor: &str) {
        self.consumed = self.consumed.saturating_add(amount);
        tracing::trace!(amount, descriptor, consumed = self.consumed, "Gas consumed");
    }
}

/// Host context for one transaction or one end-block call
#[derive(Debug, Clone, Default)]
pub struct HostEnv {
    /// Current block height
    pub block_height: i64,
    /// Proposer of the current block
    pub proposer: Option<Address>,
    /// Gas meter of the transaction being processed
    pub gas_meter: GasMeter,
    /// Events emitted so far
    pub events: Vec<Event>,
    /// Minimum gas prices annotated by the pre-phase
    pub min_gas_prices: Vec<DecCoin>,
    /// Transaction priority annotated by the pre-phase
    pub priority: i64,
}

impl HostEnv {
    pub fn new(block_height: i64) -> Self {
        Self {
            block_height,
            gas_meter: GasMeter::new(),
            ..Default::default()
        }
    }

    pub fn with_proposer(mut self, proposer: Address) -> Self {
        self.proposer = Some(proposer);
        self
    }

    pub fn with_gas_meter(mut self, gas_meter: GasMeter) -> Self {
        self.gas_meter = gas_meter;
        self
    }

    pub fn emit_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events of the given type, in emission order
    pub fn events_of(&self, kind: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }
}
