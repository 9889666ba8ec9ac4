//! Key-value blob storage for persisted store state
//!
//! The persistence collaborator is a plain string key-value interface;
//! the browser's storage, a file, or an in-memory map can all sit behind
//! it. Stores tolerate missing and corrupt blobs by falling back to
//! defaults, so `read` is infallible; only writes surface errors.

use std::collections::HashMap;

use thiserror::Error;

/// Errors from the storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to encode blob: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage backend unavailable: {0}")]
    Backend(String),
}

/// A named-blob store.
pub trait BlobStore {
    /// Read the blob under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Write the blob under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory blob store, for tests and the demo.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a blob, as a previous session would have left it.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_roundtrips() {
        let mut store = MemoryBlobStore::new();

        assert!(store.read("missing").is_none());

        store.write("key", "{\"theme\":\"dark\"}").unwrap();
        assert_eq!(store.read("key").as_deref(), Some("{\"theme\":\"dark\"}"));

        store.write("key", "{\"theme\":\"light\"}").unwrap();
        assert_eq!(store.read("key").as_deref(), Some("{\"theme\":\"light\"}"));
    }

    #[test]
    fn with_entry_preloads() {
        let store = MemoryBlobStore::new().with_entry("key", "value");
        assert_eq!(store.read("key").as_deref(), Some("value"));
    }
}
