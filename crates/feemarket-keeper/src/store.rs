//! Key-value storage
//!
//! The module persists three keys into a single namespace supplied by the
//! host. [`MemStore`] is the in-memory implementation used by tests and the
//! CLI; it can be snapshotted to JSON with hex-encoded keys and values.

use feemarket_common::{FeeMarketError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Byte-oriented store with deterministic (sorted) iteration
pub trait KvStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &[u8], value: Vec<u8>) -> Result<()>;
    /// All entries in ascending key order
    fn iter(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

/// JSON snapshot form of a [`MemStore`]
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    entries: BTreeMap<String, String>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Serialize every entry to JSON
    pub fn to_snapshot(&self) -> Result<String> {
        let snapshot = Snapshot {
            entries: self
                .iter()?
                .into_iter()
                .map(|(k, v)| (hex::encode(k), hex::encode(v)))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Rebuild a store from a JSON snapshot
    pub fn from_snapshot(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        let mut entries = BTreeMap::new();
        for (k, v) in snapshot.entries {
            let key = hex::decode(&k)
                .map_err(|e| FeeMarketError::Codec(format!("invalid snapshot key {}: {}", k, e)))?;
            let value = hex::decode(&v)
                .map_err(|e| FeeMarketError::Codec(format!("invalid snapshot value for {}: {}", k, e)))?;
            entries.insert(key, value);
        }
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_snapshot()?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), entries = self.len(), "Store snapshot written");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_snapshot(&json)?;
        debug!(path = %path.display(), entries = store.len(), "Store snapshot loaded");
        Ok(store)
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.entries.write().insert(key.to_vec(), value);
        Ok(())
    }

    fn iter(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
