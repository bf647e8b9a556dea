//! Token store.
//!
//! Tokens are stored at `jwt/<path>` for operators, accounts and users.
//! Every token is decoded and verified before it is written, and its claim
//! type must match the role of the path.

use crate::error::{EngineError, Result};
use crate::listing::leaf_names;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warden_core::{Category, IdentityPath, Listing};
use warden_jwt::{ClaimType, DecodedClaims, decode_as};
use warden_store::{Storage, get_json, put_json};

/// Stored form of a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtRecord {
    pub jwt: String,
}

pub struct JwtStore {
    storage: Arc<dyn Storage>,
}

impl JwtStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Verify `token` and store it at `path`.
    pub async fn put(&self, path: &IdentityPath, token: &str) -> Result<DecodedClaims> {
        let expected = expected_claim_type(path)?;
        let claims = decode_as(token.trim(), expected).map_err(|e| EngineError::at(path, e))?;

        let record = JwtRecord {
            jwt: token.trim().to_string(),
        };
        put_json(self.storage.as_ref(), &path.in_category(Category::Jwt), &record).await?;

        tracing::info!(
            path = %path,
            subject = %claims.subject(),
            issuer = %claims.issuer(),
            "Stored token"
        );
        Ok(claims)
    }

    pub async fn get(&self, path: &IdentityPath) -> Result<Option<String>> {
        let record: Option<JwtRecord> =
            get_json(self.storage.as_ref(), &path.in_category(Category::Jwt)).await?;
        Ok(record.map(|r| r.jwt))
    }

    /// Read and decode the token at `path`.
    pub async fn decoded(&self, path: &IdentityPath) -> Result<Option<DecodedClaims>> {
        let Some(token) = self.get(path).await? else {
            return Ok(None);
        };
        let expected = expected_claim_type(path)?;
        let claims = decode_as(&token, expected).map_err(|e| EngineError::at(path, e))?;
        Ok(Some(claims))
    }

    pub async fn exists(&self, path: &IdentityPath) -> Result<bool> {
        Ok(self
            .storage
            .get(&path.in_category(Category::Jwt))
            .await?
            .is_some())
    }

    /// Remove the token at `path`. Removing an absent token succeeds.
    pub async fn delete(&self, path: &IdentityPath) -> Result<()> {
        self.storage.delete(&path.in_category(Category::Jwt)).await?;
        tracing::debug!(path = %path, "Deleted token");
        Ok(())
    }

    pub async fn list(&self, listing: &Listing) -> Result<Vec<String>> {
        leaf_names(self.storage.as_ref(), Category::Jwt, listing).await
    }
}

fn expected_claim_type(path: &IdentityPath) -> Result<ClaimType> {
    ClaimType::for_role(path.role()).ok_or_else(|| {
        EngineError::validation("path", format!("{path} is a signing key and carries no token"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::Role;
    use warden_jwt::{AccountClaims, KeyPair, OperatorClaims, TokenBuilder};
    use warden_store::MemoryStorage;

    fn store() -> JwtStore {
        JwtStore::new(Arc::new(MemoryStorage::new()))
    }

    fn operator_token() -> (KeyPair, String) {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let token = TokenBuilder::new(operator.clone())
            .sign(
                "op1",
                &operator.public_key(),
                ClaimType::Operator,
                OperatorClaims::default(),
            )
            .unwrap();
        (operator, token)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = store();
        let path = IdentityPath::operator("op1");
        let (operator, token) = operator_token();

        let claims = store.put(&path, &token).await.unwrap();
        assert_eq!(claims.subject(), operator.public_key());
        assert_eq!(store.get(&path).await.unwrap(), Some(token));
        assert!(matches!(
            store.decoded(&path).await.unwrap(),
            Some(DecodedClaims::Operator(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_claim_type_rejected() {
        let store = store();
        let (operator, _) = operator_token();
        let account = KeyPair::generate(Role::Account).unwrap();
        let account_token = TokenBuilder::new(operator)
            .sign(
                "acc1",
                &account.public_key(),
                ClaimType::Account,
                AccountClaims::default(),
            )
            .unwrap();

        let path = IdentityPath::operator("op1");
        assert!(matches!(
            store.put(&path, &account_token).await,
            Err(EngineError::WrongClaimType {
                expected: ClaimType::Operator,
                found: ClaimType::Account,
                ..
            })
        ));
        assert!(!store.exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_token_rejected() {
        let store = store();
        let path = IdentityPath::account("op1", "acc1");
        assert!(matches!(
            store.put(&path, "not-a-token").await,
            Err(EngineError::Signing(_))
        ));
    }

    #[tokio::test]
    async fn test_signing_key_path_rejected() {
        let store = store();
        let (_, token) = operator_token();
        let path = IdentityPath::operator_signing_key("op1", "sk1");
        assert!(matches!(
            store.put(&path, &token).await,
            Err(EngineError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_idempotent() {
        let store = store();
        let path = IdentityPath::operator("op1");
        let (_, token) = operator_token();

        store.put(&path, &token).await.unwrap();
        store.delete(&path).await.unwrap();
        store.delete(&path).await.unwrap();
        assert_eq!(store.get(&path).await.unwrap(), None);
    }
}
