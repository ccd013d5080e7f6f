//! Where document JSON physically lives.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, StoreError};

/// Raw key/value storage for JSON documents.
///
/// Implementations must be safe to call from blocking worker threads.
pub trait DocumentBackend: Send + Sync {
    /// JSON stored under `key`, or `None` if nothing was ever saved.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document under `key`.
    fn write(&self, key: &str, json: &str) -> Result<()>;

    /// Delete the document under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(documents.get(key).cloned())
    }

    fn write(&self, key: &str, json: &str) -> Result<()> {
        let mut documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        documents.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        documents.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
