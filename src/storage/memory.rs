use std::{collections::HashMap, sync::Mutex};

use serde_json::Value;

use super::{Result, StateStore};

/// In-memory store used by tests and embedders that manage persistence
/// elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored slice, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned()
    }

    /// Pre-seeds a slice, mimicking state left by a previous session.
    pub fn seed(&self, key: &str, value: Value) {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value);
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}
