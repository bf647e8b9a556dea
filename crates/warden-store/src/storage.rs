//! Storage trait and typed helpers.

use crate::error::StorageError;
use crate::file::FileStorage;
use crate::memory::MemoryStorage;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use warden_core::config::{StorageBackend, StorageConfig};

/// Trait for path-addressed storage backends.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the record at `path`.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Create or overwrite the record at `path`.
    async fn put(&self, path: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove the record at `path`. Removing an absent record succeeds.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Immediate children of `prefix`, sorted.
    ///
    /// Leaf records are returned by name, sub-trees as `name/`. A name with
    /// both a record and a sub-tree appears twice.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Create a storage backend based on configuration.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, StorageError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::File => Ok(Arc::new(FileStorage::new(&config.directory)?)),
    }
}

/// Read and decode a JSON record.
pub async fn get_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    path: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get(path).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Serialization {
                path: path.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode and write a JSON record.
pub async fn put_json<T: Serialize + Sync>(
    storage: &dyn Storage,
    path: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Serialization {
        path: path.to_string(),
        source,
    })?;
    storage.put(path, bytes).await
}

/// Split a listing prefix into the immediate child of `key`, if any.
pub(crate) fn immediate_child<'a>(prefix: &str, key: &'a str) -> Option<&'a str> {
    let rest = key.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }
    match rest.find('/') {
        Some(idx) => Some(&rest[..=idx]),
        None => Some(rest),
    }
}
