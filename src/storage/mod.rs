//! Persistence collaborators for ledger state slices.

pub mod json_backend;
pub mod memory;

use serde_json::Value;

use crate::errors::LedgerError;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over key-value stores holding one JSON document per state
/// slice. Saves replace the whole slice; there is no patching.
pub trait StateStore: Send + Sync {
    /// Returns the stored document for `key`, or `None` when no prior state
    /// exists.
    fn load(&self, key: &str) -> Result<Option<Value>>;
    fn save(&self, key: &str, value: &Value) -> Result<()>;
}

/// Shared handles forward to the underlying store, so a test or embedder
/// can keep a reference to a store it has handed to a session.
impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        (**self).save(key, value)
    }
}

pub use json_backend::JsonStore;
pub use memory::MemoryStore;
