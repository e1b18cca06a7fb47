//! Events emitted by the fee pipeline

use serde::{Deserialize, Serialize};

/// Escrow accepted in the pre-phase
pub const EVENT_TYPE_TX: &str = "tx";
/// Required fee settled in the post-phase
pub const EVENT_TYPE_FEE_PAY: &str = "fee_pay";
/// Tip paid to the block proposer
pub const EVENT_TYPE_TIP_PAY: &str = "tip_pay";

pub const ATTRIBUTE_KEY_FEE: &str = "fee";
pub const ATTRIBUTE_KEY_FEE_PAYER: &str = "fee_payer";
pub const ATTRIBUTE_KEY_TIP: &str = "tip";
pub const ATTRIBUTE_KEY_TIP_PAYEE: &str = "tip_payee";

/// Key/value pair attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

/// Typed event with ordered attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(EventAttribute {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// First value for `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}
