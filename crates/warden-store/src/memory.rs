//! In-memory storage backend.

use crate::error::StorageError;
use crate::storage::{Storage, immediate_child};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

/// Process-local storage keyed by path.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.records
            .read()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.get(path).cloned())
    }

    async fn put(&self, path: &str, value: Vec<u8>) -> Result<(), StorageError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        records.insert(path.to_string(), value);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        records.remove(path);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        let children: BTreeSet<String> = records
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter_map(|(key, _)| immediate_child(prefix, key))
            .map(str::to_string)
            .collect();
        Ok(children.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let storage = MemoryStorage::new();

        storage.put("nkey/operator/op1", b"seed".to_vec()).await.unwrap();
        assert_eq!(
            storage.get("nkey/operator/op1").await.unwrap(),
            Some(b"seed".to_vec())
        );

        storage.delete("nkey/operator/op1").await.unwrap();
        assert_eq!(storage.get("nkey/operator/op1").await.unwrap(), None);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop() {
        let storage = MemoryStorage::new();
        storage.delete("nkey/operator/missing").await.unwrap();
        storage.delete("nkey/operator/missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_immediate_children() {
        let storage = MemoryStorage::new();
        for path in [
            "nkey/operator/op1",
            "nkey/operator/op1/account/acc1",
            "nkey/operator/op1/account/acc1/signing/sk1",
            "nkey/operator/op1/account/acc2",
            "nkey/operator/op2",
            "nkey/operatorx",
        ] {
            storage.put(path, Vec::new()).await.unwrap();
        }

        let operators = storage.list("nkey/operator/").await.unwrap();
        assert_eq!(operators, vec!["op1", "op1/", "op2"]);

        let accounts = storage.list("nkey/operator/op1/account/").await.unwrap();
        assert_eq!(accounts, vec!["acc1", "acc1/", "acc2"]);

        assert!(storage.list("nkey/operator/op3/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_path_rejected() {
        let storage = MemoryStorage::new();
        assert!(storage.put("", Vec::new()).await.is_err());
        assert!(storage.put("nkey/", Vec::new()).await.is_err());
    }
}
