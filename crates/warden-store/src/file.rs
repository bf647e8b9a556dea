//! File-based storage backend.
//!
//! The record at `a/b/c` is stored in `<root>/a/b/c.json`; records below it
//! live in the directory `<root>/a/b/c/`. Writes go through a temporary file
//! and a rename so readers never observe a partially written record.

use crate::error::StorageError;
use crate::storage::Storage;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const RECORD_EXTENSION: &str = ".json";

/// Storage writing one file per record.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a new file storage rooted at `root`, creating the directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .map_err(|e| StorageError::io(root.display().to_string(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn segments(path: &str) -> Result<Vec<&str>, StorageError> {
        let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
        let valid = segments
            .iter()
            .all(|s| !s.is_empty() && *s != "." && *s != ".." && !s.contains('\\'));
        if path.is_empty() || !valid {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(segments)
    }

    fn record_file(&self, path: &str) -> Result<PathBuf, StorageError> {
        if path.ends_with('/') {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        let segments = Self::segments(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;

        let mut file = self.root.clone();
        file.extend(parents);
        file.push(format!("{last}{RECORD_EXTENSION}"));
        Ok(file)
    }

    fn directory(&self, prefix: &str) -> Result<PathBuf, StorageError> {
        let mut dir = self.root.clone();
        if !prefix.trim_matches('/').is_empty() {
            dir.extend(Self::segments(prefix)?);
        }
        Ok(dir)
    }

    /// Remove now-empty directories between `dir` and the root.
    async fn prune_empty_dirs(&self, mut dir: Option<&Path>) {
        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            // Fails on non-empty directories, which ends the walk.
            if fs::remove_dir(current).await.is_err() {
                break;
            }
            dir = current.parent();
        }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let file = self.record_file(path)?;
        match fs::read(&file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    async fn put(&self, path: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let file = self.record_file(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(path, e))?;
        }

        let tmp = file.with_extension("json.tmp");
        fs::write(&tmp, &value)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        fs::rename(&tmp, &file)
            .await
            .map_err(|e| StorageError::io(path, e))?;

        tracing::debug!(path = %path, bytes = value.len(), "Stored record");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let file = self.record_file(path)?;
        match fs::remove_file(&file).await {
            Ok(()) => {
                tracing::debug!(path = %path, "Deleted record");
                self.prune_empty_dirs(file.parent()).await;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.directory(prefix)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(prefix, e)),
        };

        let mut children = BTreeSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(prefix, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageError::io(prefix, e))?;

            if file_type.is_dir() {
                children.insert(format!("{name}/"));
            } else if let Some(record) = name.strip_suffix(RECORD_EXTENSION) {
                children.insert(record.to_string());
            }
        }

        Ok(children.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage
            .put("jwt/operator/op1", b"token".to_vec())
            .await
            .unwrap();
        assert!(dir.path().join("jwt/operator/op1.json").exists());
        assert_eq!(
            storage.get("jwt/operator/op1").await.unwrap(),
            Some(b"token".to_vec())
        );

        storage
            .put("jwt/operator/op1", b"token2".to_vec())
            .await
            .unwrap();
        assert_eq!(
            storage.get("jwt/operator/op1").await.unwrap(),
            Some(b"token2".to_vec())
        );
    }

    #[tokio::test]
    async fn test_list_leaves_and_folders() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        for path in [
            "nkey/operator/op1/account/acc1",
            "nkey/operator/op1/account/acc1/signing/sk1",
            "nkey/operator/op1/account/acc2",
        ] {
            storage.put(path, Vec::new()).await.unwrap();
        }

        let accounts = storage.list("nkey/operator/op1/account/").await.unwrap();
        assert_eq!(accounts, vec!["acc1", "acc1/", "acc2"]);
        assert!(storage.list("nkey/operator/none/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_prunes_directories() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage
            .put("nkey/operator/op1/signing/sk1", Vec::new())
            .await
            .unwrap();
        storage.delete("nkey/operator/op1/signing/sk1").await.unwrap();
        storage.delete("nkey/operator/op1/signing/sk1").await.unwrap();

        assert!(storage.list("nkey/operator/").await.unwrap().is_empty());
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(matches!(
            storage.put("nkey/../escape", Vec::new()).await,
            Err(StorageError::InvalidPath(_))
        ));
        assert!(storage.get("nkey//x").await.is_err());
    }
}
