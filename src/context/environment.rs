//! Shared context environment.
//!
//! Every context derived from a common ancestor holds a handle to the same
//! map, so a change made through one context is visible through all of them.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handle to a shared, concurrently mutable environment map.
///
/// `Clone` hands out another handle to the same map, never a copy.
#[derive(Clone, Default)]
pub struct Environment {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: HashMap<String, Value>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Upsert; returns the previous value for the key
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.write().insert(key.into(), value)
    }

    /// Delete; returns the removed value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Point-in-time copy of the entries
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.entries.read().clone()
    }

    /// Whether both handles refer to the same map
    pub fn shares_with(&self, other: &Environment) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.read().iter()).finish()
    }
}

impl From<HashMap<String, Value>> for Environment {
    fn from(entries: HashMap<String, Value>) -> Self {
        Self::from_map(entries)
    }
}
