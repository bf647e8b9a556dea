//! Key-pair store.
//!
//! One seed per identity path, stored at `nkey/<path>`. Signing-key paths
//! are stored the same way as identity paths.

use crate::error::{EngineError, Result};
use crate::listing::leaf_names;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warden_core::{Category, IdentityPath, Listing};
use warden_jwt::KeyPair;
use warden_store::{Storage, get_json, put_json};

/// Stored form of a key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NkeyRecord {
    pub seed: String,
}

pub struct NkeyStore {
    storage: Arc<dyn Storage>,
}

impl NkeyStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Return the key pair at `path`, creating it when absent.
    ///
    /// An existing seed wins over `seed`. Otherwise `seed` is validated and
    /// stored, or a fresh seed for the path's role is generated.
    pub async fn ensure(&self, path: &IdentityPath, seed: Option<&str>) -> Result<KeyPair> {
        if let Some(existing) = self.read(path).await? {
            return Ok(existing);
        }

        let key_pair = match seed {
            Some(seed) => KeyPair::from_seed(seed, path.role()),
            None => KeyPair::generate(path.role()),
        }
        .map_err(|e| EngineError::at(path, e))?;

        self.write(path, &key_pair).await?;
        tracing::info!(path = %path, public_key = %key_pair.public_key(), "Created key pair");
        Ok(key_pair)
    }

    /// Read the key pair at `path`, validating the stored seed's role.
    pub async fn read(&self, path: &IdentityPath) -> Result<Option<KeyPair>> {
        let record: Option<NkeyRecord> =
            get_json(self.storage.as_ref(), &path.in_category(Category::Nkey)).await?;
        record
            .map(|r| KeyPair::from_seed(&r.seed, path.role()).map_err(|e| EngineError::at(path, e)))
            .transpose()
    }

    /// Whether a seed is stored at `path`, without decoding it.
    pub async fn exists(&self, path: &IdentityPath) -> Result<bool> {
        Ok(self
            .storage
            .get(&path.in_category(Category::Nkey))
            .await?
            .is_some())
    }

    /// Store `seed` at `path`, replacing any existing seed.
    pub async fn import(&self, path: &IdentityPath, seed: &str) -> Result<KeyPair> {
        let key_pair = KeyPair::from_seed(seed, path.role()).map_err(|e| EngineError::at(path, e))?;
        self.write(path, &key_pair).await?;
        tracing::info!(path = %path, public_key = %key_pair.public_key(), "Imported key pair");
        Ok(key_pair)
    }

    /// Remove the key pair at `path`. Removing an absent key pair succeeds.
    pub async fn delete(&self, path: &IdentityPath) -> Result<()> {
        self.storage.delete(&path.in_category(Category::Nkey)).await?;
        tracing::debug!(path = %path, "Deleted key pair");
        Ok(())
    }

    /// Names of the key pairs directly below `listing`.
    pub async fn list(&self, listing: &Listing) -> Result<Vec<String>> {
        leaf_names(self.storage.as_ref(), Category::Nkey, listing).await
    }

    async fn write(&self, path: &IdentityPath, key_pair: &KeyPair) -> Result<()> {
        let record = NkeyRecord {
            seed: key_pair.seed().to_string(),
        };
        put_json(self.storage.as_ref(), &path.in_category(Category::Nkey), &record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::Role;
    use warden_store::MemoryStorage;

    fn store() -> NkeyStore {
        NkeyStore::new(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_ensure_generates_once() {
        let store = store();
        let path = IdentityPath::operator("op1");

        let first = store.ensure(&path, None).await.unwrap();
        assert!(first.seed().starts_with("SO"));
        assert!(first.public_key().starts_with('O'));

        let second = store.ensure(&path, None).await.unwrap();
        assert_eq!(first.seed(), second.seed());
    }

    #[tokio::test]
    async fn test_ensure_with_supplied_seed() {
        let store = store();
        let supplied = KeyPair::generate(Role::Account).unwrap();
        let path = IdentityPath::account("op1", "acc1");

        let stored = store.ensure(&path, Some(supplied.seed())).await.unwrap();
        assert_eq!(stored.public_key(), supplied.public_key());

        // An existing seed is never replaced by ensure.
        let other = KeyPair::generate(Role::Account).unwrap();
        let again = store.ensure(&path, Some(other.seed())).await.unwrap();
        assert_eq!(again.public_key(), supplied.public_key());
    }

    #[tokio::test]
    async fn test_wrong_seed_type_rejected() {
        let store = store();
        let user = KeyPair::generate(Role::User).unwrap();
        let path = IdentityPath::operator("op1");

        assert!(matches!(
            store.ensure(&path, Some(user.seed())).await,
            Err(EngineError::WrongSeedType { .. })
        ));
        assert!(matches!(
            store.import(&path, user.seed()).await,
            Err(EngineError::WrongSeedType { .. })
        ));
        assert!(!store.exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_signing_key_roles() {
        let store = store();
        let op_signing = store
            .ensure(&IdentityPath::operator_signing_key("op1", "sk1"), None)
            .await
            .unwrap();
        assert!(op_signing.public_key().starts_with('O'));

        let acc_signing = store
            .ensure(&IdentityPath::account_signing_key("op1", "acc1", "sk1"), None)
            .await
            .unwrap();
        assert!(acc_signing.public_key().starts_with('A'));
    }

    #[tokio::test]
    async fn test_delete_idempotent() {
        let store = store();
        let path = IdentityPath::user("op1", "acc1", "alice");

        store.ensure(&path, None).await.unwrap();
        store.delete(&path).await.unwrap();
        store.delete(&path).await.unwrap();
        assert!(store.read(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_skips_folders() {
        let store = store();
        store
            .ensure(&IdentityPath::account("op1", "acc1"), None)
            .await
            .unwrap();
        store
            .ensure(&IdentityPath::account_signing_key("op1", "acc1", "sk1"), None)
            .await
            .unwrap();
        store
            .ensure(&IdentityPath::account("op1", "acc2"), None)
            .await
            .unwrap();
        // Signing key of an account that has no key pair of its own.
        store
            .ensure(&IdentityPath::account_signing_key("op1", "acc3", "sk1"), None)
            .await
            .unwrap();

        let accounts = store
            .list(&Listing::Accounts {
                operator: "op1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(accounts, vec!["acc1", "acc2"]);
    }
}
