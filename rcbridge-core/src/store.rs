//! Blob store seam: a flat name-to-bytes namespace the host persists. The
//! core touches it only during startup, pairing, and reset.

use std::collections::HashMap;

/// Storage failure. `NotFound` from a read is fatal only during the pairing
/// bootstrap; everywhere else the caller logs and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no blob named <{0}>")]
    NotFound(String),
    #[error("short write: {wrote} of {expected} bytes")]
    ShortWrite { wrote: usize, expected: usize },
    #[error("{0}")]
    Backend(String),
}

/// Flat blob storage.
pub trait BlobStore {
    fn exists(&self, name: &str) -> bool;

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Write the whole blob, replacing any previous content atomically.
    /// Returns the number of bytes written; the caller treats a short count
    /// as a failed write.
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, StoreError>;

    fn remove(&mut self, name: &str) -> Result<(), StoreError>;
}

/// Volatile store for hosts without a filesystem, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemStore {
    fn exists(&self, name: &str) -> bool {
        self.blobs.contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, StoreError> {
        self.blobs.insert(name.to_string(), bytes.to_vec());
        Ok(bytes.len())
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        self.blobs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
