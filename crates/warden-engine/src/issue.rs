//! Issue records: the desired state of each identity.
//!
//! A record is written before key material and tokens are derived from it,
//! so a record without a token means the identity is not issued yet.
//! Status is computed on every read and never stored.

use crate::error::Result;
use crate::listing::leaf_names;
use crate::params::{
    AccountClaimsInput, AccountIssueParams, OperatorClaimsInput, OperatorIssueParams,
    SyncSettings, UserClaimsInput, UserIssueParams,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use warden_core::{Category, IdentityPath, Listing};
use warden_store::{Storage, get_json, put_json};
use warden_sync::{SyncReport, SyncStatus};

/// Name of the system-account user whose credentials authenticate pushes.
pub const PUSH_USER: &str = "default-push";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorIssue {
    pub operator: String,
    #[serde(default)]
    pub signing_keys: BTreeSet<String>,
    pub system_account: String,
    pub create_system_account: bool,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub claims: OperatorClaimsInput,
}

impl OperatorIssue {
    pub fn new(operator: &str, params: OperatorIssueParams) -> Self {
        Self {
            operator: operator.to_string(),
            signing_keys: params.signing_keys,
            system_account: params.system_account,
            create_system_account: params.create_system_account,
            sync: params.sync,
            claims: params.claims,
        }
    }

    /// Record created when a signing key is imported before its operator
    /// was ever issued.
    pub fn minimal(operator: &str) -> Self {
        Self::new(operator, OperatorIssueParams::default())
    }

    pub fn path(&self) -> IdentityPath {
        IdentityPath::operator(&self.operator)
    }

    pub fn system_account_path(&self) -> IdentityPath {
        IdentityPath::account(&self.operator, &self.system_account)
    }

    pub fn push_user_path(&self) -> IdentityPath {
        IdentityPath::user(&self.operator, &self.system_account, PUSH_USER)
    }

    pub fn signing_key_paths(&self) -> impl Iterator<Item = IdentityPath> + '_ {
        self.signing_keys
            .iter()
            .map(|key| IdentityPath::operator_signing_key(&self.operator, key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountIssue {
    pub operator: String,
    pub account: String,
    #[serde(default)]
    pub use_signing_key: Option<String>,
    #[serde(default)]
    pub signing_keys: BTreeSet<String>,
    #[serde(default)]
    pub claims: AccountClaimsInput,
}

impl AccountIssue {
    pub fn new(operator: &str, account: &str, params: AccountIssueParams) -> Self {
        Self {
            operator: operator.to_string(),
            account: account.to_string(),
            use_signing_key: params.use_signing_key,
            signing_keys: params.signing_keys,
            claims: params.claims,
        }
    }

    /// The system account as the operator issues it when no account record
    /// claims it.
    pub fn system(operator: &str, account: &str) -> Self {
        let mut issue = Self::new(operator, account, AccountIssueParams::default());
        issue.claims.description = Some("System account".to_string());
        issue
    }

    pub fn minimal(operator: &str, account: &str) -> Self {
        Self::new(operator, account, AccountIssueParams::default())
    }

    pub fn path(&self) -> IdentityPath {
        IdentityPath::account(&self.operator, &self.account)
    }

    pub fn signing_key_paths(&self) -> impl Iterator<Item = IdentityPath> + '_ {
        self.signing_keys
            .iter()
            .map(|key| IdentityPath::account_signing_key(&self.operator, &self.account, key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIssue {
    pub operator: String,
    pub account: String,
    pub user: String,
    #[serde(default)]
    pub use_signing_key: Option<String>,
    #[serde(default)]
    pub claims: UserClaimsInput,
}

impl UserIssue {
    pub fn new(operator: &str, account: &str, user: &str, params: UserIssueParams) -> Self {
        Self {
            operator: operator.to_string(),
            account: account.to_string(),
            user: user.to_string(),
            use_signing_key: params.use_signing_key,
            claims: params.claims,
        }
    }

    /// The push user, allowed to publish claim updates and read replies.
    pub fn push(operator: &str, system_account: &str) -> Self {
        let mut issue = Self::new(operator, system_account, PUSH_USER, UserIssueParams::default());
        issue.claims.extra.insert(
            "pub".to_string(),
            serde_json::json!({"allow": ["$SYS.REQ.CLAIMS.>"]}),
        );
        issue
            .claims
            .extra
            .insert("sub".to_string(), serde_json::json!({"allow": ["_INBOX.>"]}));
        issue
    }

    pub fn path(&self) -> IdentityPath {
        IdentityPath::user(&self.operator, &self.account, &self.user)
    }
}

/// Presence of an identity's key pair and token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IdentityStatus {
    pub nkey: bool,
    pub jwt: bool,
}

impl IdentityStatus {
    pub fn issued(&self) -> bool {
        self.nkey && self.jwt
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperatorStatus {
    #[serde(flatten)]
    pub identity: IdentityStatus,
    pub system_account: IdentityStatus,
    pub push_user: IdentityStatus,
}

/// Result of the last push or revoke for an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SyncStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SyncReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncOutcome {
    pub fn completed(report: SyncReport) -> Self {
        Self {
            at: Utc::now(),
            status: Some(report.status()),
            report: Some(report),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            at: Utc::now(),
            status: None,
            report: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountStatus {
    #[serde(flatten)]
    pub identity: IdentityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOutcome>,
}

/// A record together with its computed status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueView<R, S> {
    #[serde(flatten)]
    pub issue: R,
    pub status: S,
}

pub type OperatorIssueView = IssueView<OperatorIssue, OperatorStatus>;
pub type AccountIssueView = IssueView<AccountIssue, AccountStatus>;
pub type UserIssueView = IssueView<UserIssue, IdentityStatus>;

/// Record storage at `issue/<path>`.
pub(crate) struct IssueStore {
    storage: Arc<dyn Storage>,
}

impl IssueStore {
    pub(crate) fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &IdentityPath) -> Result<Option<T>> {
        Ok(get_json(self.storage.as_ref(), &path.in_category(Category::Issue)).await?)
    }

    pub(crate) async fn put<T: Serialize + Sync>(&self, path: &IdentityPath, issue: &T) -> Result<()> {
        put_json(self.storage.as_ref(), &path.in_category(Category::Issue), issue).await?;
        tracing::debug!(path = %path, "Stored issue record");
        Ok(())
    }

    pub(crate) async fn exists(&self, path: &IdentityPath) -> Result<bool> {
        Ok(self
            .storage
            .get(&path.in_category(Category::Issue))
            .await?
            .is_some())
    }

    pub(crate) async fn delete(&self, path: &IdentityPath) -> Result<()> {
        self.storage.delete(&path.in_category(Category::Issue)).await?;
        tracing::debug!(path = %path, "Deleted issue record");
        Ok(())
    }

    pub(crate) async fn list(&self, listing: &Listing) -> Result<Vec<String>> {
        leaf_names(self.storage.as_ref(), Category::Issue, listing).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warden_store::MemoryStorage;

    #[test]
    fn test_operator_paths() {
        let issue = OperatorIssue::new(
            "op1",
            OperatorIssueParams {
                signing_keys: ["sk1".to_string(), "sk2".to_string()].into(),
                ..Default::default()
            },
        );
        assert_eq!(issue.path().to_string(), "operator/op1");
        assert_eq!(issue.system_account_path().to_string(), "operator/op1/account/SYS");
        assert_eq!(
            issue.push_user_path().to_string(),
            "operator/op1/account/SYS/user/default-push"
        );
        let signing: Vec<String> = issue.signing_key_paths().map(|p| p.to_string()).collect();
        assert_eq!(
            signing,
            vec!["operator/op1/signing/sk1", "operator/op1/signing/sk2"]
        );
    }

    #[test]
    fn test_push_user_permissions() {
        let issue = UserIssue::push("op1", "SYS");
        assert_eq!(issue.claims.extra["pub"], json!({"allow": ["$SYS.REQ.CLAIMS.>"]}));
        assert_eq!(issue.claims.extra["sub"], json!({"allow": ["_INBOX.>"]}));
    }

    #[test]
    fn test_view_serializes_status() {
        let view = IssueView {
            issue: UserIssue::new("op1", "acc1", "alice", UserIssueParams::default()),
            status: IdentityStatus {
                nkey: true,
                jwt: false,
            },
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["user"], "alice");
        assert_eq!(value["status"], json!({"nkey": true, "jwt": false}));
    }

    #[tokio::test]
    async fn test_store_roundtrip() {
        let store = IssueStore::new(Arc::new(MemoryStorage::new()));
        let issue = AccountIssue::minimal("op1", "acc1");

        store.put(&issue.path(), &issue).await.unwrap();
        assert!(store.exists(&issue.path()).await.unwrap());
        let loaded: AccountIssue = store.get(&issue.path()).await.unwrap().unwrap();
        assert_eq!(loaded, issue);

        let accounts = store
            .list(&Listing::Accounts {
                operator: "op1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(accounts, vec!["acc1"]);

        store.delete(&issue.path()).await.unwrap();
        store.delete(&issue.path()).await.unwrap();
        assert!(!store.exists(&issue.path()).await.unwrap());
    }
}
