//! The issuance engine.
//!
//! Every create or update follows the same order: validate, reconcile
//! signing keys against the previous record, persist the record, ensure key
//! pairs, sign and store the token, and finally push accounts to the cluster
//! when their operator has sync enabled. Deletes run the steps in reverse and
//! succeed when there is nothing to delete.

use crate::claims;
use crate::error::{EngineError, Result};
use crate::issue::{
    AccountIssue, AccountIssueView, AccountStatus, IdentityStatus, IssueStore, IssueView,
    OperatorIssue, OperatorIssueView, OperatorStatus, SyncOutcome, UserIssue, UserIssueView,
};
use crate::jwt::JwtStore;
use crate::nkey::NkeyStore;
use crate::params::{AccountIssueParams, OperatorIssueParams, UserIssueParams};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use warden_core::{IdentityPath, Listing, Role, SyncConfig, WardenConfig, validate_segment};
use warden_jwt::{DecodedClaims, KeyPair, format_user_creds, validate_public_key};
use warden_store::{Storage, create_storage};
use warden_sync::{
    ClientCache, ConnectionKey, Connector, ControlPlane, NatsConnector, SyncReport,
    UserCredentials,
};

/// Issues, reads and deletes operators, accounts and users.
pub struct Engine {
    nkeys: NkeyStore,
    jwts: JwtStore,
    issues: IssueStore,
    clients: ClientCache,
    /// Serializes create, update and delete calls.
    writes: Mutex<()>,
    /// Last push or revoke per account path.
    sync_outcomes: RwLock<HashMap<String, SyncOutcome>>,
}

impl Engine {
    pub fn new(storage: Arc<dyn Storage>, connector: Arc<dyn Connector>, sync: SyncConfig) -> Self {
        Self {
            nkeys: NkeyStore::new(storage.clone()),
            jwts: JwtStore::new(storage.clone()),
            issues: IssueStore::new(storage),
            clients: ClientCache::new(connector, sync),
            writes: Mutex::new(()),
            sync_outcomes: RwLock::new(HashMap::new()),
        }
    }

    /// Engine over the configured storage, syncing through `async-nats`.
    pub fn from_config(config: &WardenConfig) -> Result<Self> {
        let storage = create_storage(&config.storage)?;
        Ok(Self::new(
            storage,
            Arc::new(NatsConnector::new()),
            config.sync.clone(),
        ))
    }

    pub fn nkeys(&self) -> &NkeyStore {
        &self.nkeys
    }

    pub fn jwts(&self) -> &JwtStore {
        &self.jwts
    }

    // -------------------------------------------------------------------------
    // Operators
    // -------------------------------------------------------------------------

    /// Create or update an operator.
    ///
    /// Also bootstraps the system account and its push user unless an
    /// account or user record claims them.
    pub async fn issue_operator(
        &self,
        operator: &str,
        params: OperatorIssueParams,
    ) -> Result<OperatorIssueView> {
        validate_segment("operator", operator)?;
        params.validate()?;
        let _guard = self.writes.lock().await;

        let issue = OperatorIssue::new(operator, params);
        let path = issue.path();
        let previous: Option<OperatorIssue> = self.issues.get(&path).await?;

        if let Some(previous) = &previous {
            let removed = previous.signing_keys.difference(&issue.signing_keys);
            self.remove_signing_keys(&path, removed).await?;

            let system_moved = previous.system_account != issue.system_account
                || !issue.create_system_account;
            if previous.create_system_account && system_moved {
                self.release_system_account(previous).await?;
            }
        }

        self.issues.put(&path, &issue).await?;

        let operator_kp = self.nkeys.ensure(&path, None).await?;
        let signing_keys = self.ensure_signing_keys(issue.signing_key_paths()).await?;
        let system_account = if issue.create_system_account {
            Some(self.bootstrap_system_account(&issue, &operator_kp).await?)
        } else {
            self.nkeys
                .read(&issue.system_account_path())
                .await?
                .map(|kp| kp.public_key())
        };

        let token = claims::operator_token(&issue, &operator_kp, signing_keys, system_account)
            .map_err(|e| EngineError::at(&path, e))?;
        self.jwts.put(&path, &token).await?;
        self.clients.invalidate_operator(operator).await;

        tracing::info!(
            operator = %operator,
            public_key = %operator_kp.public_key(),
            signing_keys = issue.signing_keys.len(),
            "Issued operator"
        );
        self.operator_view(issue).await
    }

    pub async fn read_operator_issue(&self, operator: &str) -> Result<Option<OperatorIssueView>> {
        validate_segment("operator", operator)?;
        match self.issues.get(&IdentityPath::operator(operator)).await? {
            Some(issue) => Ok(Some(self.operator_view(issue).await?)),
            None => Ok(None),
        }
    }

    pub async fn list_operator_issues(&self) -> Result<Vec<String>> {
        self.issues.list(&Listing::Operators).await
    }

    /// Delete an operator, its signing keys and, unless claimed by explicit
    /// records, its system account and push user. Accounts are kept.
    pub async fn delete_operator_issue(&self, operator: &str) -> Result<()> {
        validate_segment("operator", operator)?;
        let _guard = self.writes.lock().await;

        let path = IdentityPath::operator(operator);
        let Some(issue) = self.issues.get::<OperatorIssue>(&path).await? else {
            tracing::debug!(operator = %operator, "No operator issue to delete");
            return Ok(());
        };

        for signing in issue.signing_key_paths() {
            self.nkeys.delete(&signing).await?;
        }
        self.nkeys.delete(&path).await?;
        self.jwts.delete(&path).await?;
        if issue.create_system_account {
            self.release_system_account(&issue).await?;
        }
        self.issues.delete(&path).await?;
        self.clients.invalidate_operator(operator).await;

        tracing::info!(operator = %operator, "Deleted operator");
        Ok(())
    }

    /// Key pair of the system account, plus its token and push user when no
    /// explicit record owns them. Returns the account's public key.
    async fn bootstrap_system_account(
        &self,
        issue: &OperatorIssue,
        operator: &KeyPair,
    ) -> Result<String> {
        let account_path = issue.system_account_path();
        let account_kp = self.nkeys.ensure(&account_path, None).await?;

        if self.issues.exists(&account_path).await? {
            tracing::debug!(path = %account_path, "System account owned by its account issue");
        } else {
            let system = AccountIssue::system(&issue.operator, &issue.system_account);
            let token = claims::account_token(&system, &account_kp.public_key(), Vec::new(), operator)
                .map_err(|e| EngineError::at(&account_path, e))?;
            self.jwts.put(&account_path, &token).await?;
        }

        let user_path = issue.push_user_path();
        if self.issues.exists(&user_path).await? {
            tracing::debug!(path = %user_path, "Push user owned by its user issue");
        } else {
            let push = UserIssue::push(&issue.operator, &issue.system_account);
            let user_kp = self.nkeys.ensure(&user_path, None).await?;
            let token = claims::user_token(&push, &user_kp.public_key(), &account_kp, None)
                .map_err(|e| EngineError::at(&user_path, e))?;
            self.jwts.put(&user_path, &token).await?;
        }

        Ok(account_kp.public_key())
    }

    /// Remove the system account and push user the operator created, keeping
    /// whatever an explicit record claims.
    async fn release_system_account(&self, issue: &OperatorIssue) -> Result<()> {
        for path in [issue.system_account_path(), issue.push_user_path()] {
            if self.issues.exists(&path).await? {
                tracing::info!(path = %path, "Keeping identity claimed by its own issue");
                continue;
            }
            self.nkeys.delete(&path).await?;
            self.jwts.delete(&path).await?;
        }
        Ok(())
    }

    async fn operator_view(&self, issue: OperatorIssue) -> Result<OperatorIssueView> {
        let status = OperatorStatus {
            identity: self.identity_status(&issue.path()).await?,
            system_account: self.identity_status(&issue.system_account_path()).await?,
            push_user: self.identity_status(&issue.push_user_path()).await?,
        };
        Ok(IssueView { issue, status })
    }

    // -------------------------------------------------------------------------
    // Accounts
    // -------------------------------------------------------------------------

    /// Create or update an account and push it when its operator syncs.
    pub async fn issue_account(
        &self,
        operator: &str,
        account: &str,
        params: AccountIssueParams,
    ) -> Result<AccountIssueView> {
        validate_segment("operator", operator)?;
        validate_segment("account", account)?;
        params.validate()?;
        let _guard = self.writes.lock().await;

        let issue = AccountIssue::new(operator, account, params);
        let path = issue.path();
        let previous: Option<AccountIssue> = self.issues.get(&path).await?;

        if let Some(previous) = &previous {
            let removed = previous.signing_keys.difference(&issue.signing_keys);
            self.remove_signing_keys(&path, removed).await?;
        }

        self.issues.put(&path, &issue).await?;

        let account_kp = self.nkeys.ensure(&path, None).await?;
        let signing_keys = self.ensure_signing_keys(issue.signing_key_paths()).await?;
        let signer = self
            .resolve_signer(&path, issue.use_signing_key.as_deref())
            .await?;

        let token = claims::account_token(&issue, &account_kp.public_key(), signing_keys, &signer)
            .map_err(|e| EngineError::at(&path, e))?;
        self.jwts.put(&path, &token).await?;

        tracing::info!(
            operator = %operator,
            account = %account,
            public_key = %account_kp.public_key(),
            issuer = %signer.public_key(),
            "Issued account"
        );

        if let Some(operator_issue) = self.syncing_operator(operator).await? {
            let outcome = match self.push_token(&operator_issue, &token).await {
                Ok(report) => SyncOutcome::completed(report),
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Account push failed");
                    SyncOutcome::failed(e)
                }
            };
            self.record_sync(&path, outcome);
        }

        self.account_view(issue).await
    }

    pub async fn read_account_issue(
        &self,
        operator: &str,
        account: &str,
    ) -> Result<Option<AccountIssueView>> {
        validate_segment("operator", operator)?;
        validate_segment("account", account)?;
        match self.issues.get(&IdentityPath::account(operator, account)).await? {
            Some(issue) => Ok(Some(self.account_view(issue).await?)),
            None => Ok(None),
        }
    }

    pub async fn list_account_issues(&self, operator: &str) -> Result<Vec<String>> {
        validate_segment("operator", operator)?;
        self.issues
            .list(&Listing::Accounts {
                operator: operator.to_string(),
            })
            .await
    }

    /// Delete an account and its signing keys. When the operator syncs, the
    /// account is revoked on the cluster first and the outcome returned.
    /// Users of the account are kept.
    pub async fn delete_account_issue(
        &self,
        operator: &str,
        account: &str,
    ) -> Result<Option<SyncOutcome>> {
        validate_segment("operator", operator)?;
        validate_segment("account", account)?;
        let _guard = self.writes.lock().await;

        let path = IdentityPath::account(operator, account);
        let Some(issue) = self.issues.get::<AccountIssue>(&path).await? else {
            tracing::debug!(path = %path, "No account issue to delete");
            return Ok(None);
        };

        let mut outcome = None;
        if let Some(operator_issue) = self.syncing_operator(operator).await? {
            if let Some(account_kp) = self.nkeys.read(&path).await? {
                let revoked = self
                    .revoke_keys(&operator_issue, &[account_kp.public_key()])
                    .await;
                outcome = Some(match revoked {
                    Ok(report) => SyncOutcome::completed(report),
                    Err(e) => {
                        tracing::warn!(path = %path, error = %e, "Account revoke failed");
                        SyncOutcome::failed(e)
                    }
                });
            }
        }

        for signing in issue.signing_key_paths() {
            self.nkeys.delete(&signing).await?;
        }
        self.nkeys.delete(&path).await?;
        self.jwts.delete(&path).await?;
        self.issues.delete(&path).await?;
        self.forget_sync(&path);

        tracing::info!(operator = %operator, account = %account, "Deleted account");
        Ok(outcome)
    }

    async fn account_view(&self, issue: AccountIssue) -> Result<AccountIssueView> {
        let path = issue.path();
        let status = AccountStatus {
            identity: self.identity_status(&path).await?,
            sync: self.last_sync(&path),
        };
        Ok(IssueView { issue, status })
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Create or update a user.
    pub async fn issue_user(
        &self,
        operator: &str,
        account: &str,
        user: &str,
        params: UserIssueParams,
    ) -> Result<UserIssueView> {
        validate_segment("operator", operator)?;
        validate_segment("account", account)?;
        validate_segment("user", user)?;
        params.validate()?;
        let _guard = self.writes.lock().await;

        let issue = UserIssue::new(operator, account, user, params);
        let path = issue.path();
        self.issues.put(&path, &issue).await?;

        let user_kp = self.nkeys.ensure(&path, None).await?;
        let signer = self
            .resolve_signer(&path, issue.use_signing_key.as_deref())
            .await?;
        let issuer_account = match issue.use_signing_key {
            Some(_) => Some(self.parent_key(&path).await?.public_key()),
            None => None,
        };

        let token = claims::user_token(&issue, &user_kp.public_key(), &signer, issuer_account)
            .map_err(|e| EngineError::at(&path, e))?;
        self.jwts.put(&path, &token).await?;

        tracing::info!(
            path = %path,
            public_key = %user_kp.public_key(),
            issuer = %signer.public_key(),
            "Issued user"
        );
        self.user_view(issue).await
    }

    pub async fn read_user_issue(
        &self,
        operator: &str,
        account: &str,
        user: &str,
    ) -> Result<Option<UserIssueView>> {
        let path = IdentityPath::user(operator, account, user);
        path.validate()?;
        match self.issues.get(&path).await? {
            Some(issue) => Ok(Some(self.user_view(issue).await?)),
            None => Ok(None),
        }
    }

    pub async fn list_user_issues(&self, operator: &str, account: &str) -> Result<Vec<String>> {
        validate_segment("operator", operator)?;
        validate_segment("account", account)?;
        self.issues
            .list(&Listing::Users {
                operator: operator.to_string(),
                account: account.to_string(),
            })
            .await
    }

    pub async fn delete_user_issue(&self, operator: &str, account: &str, user: &str) -> Result<()> {
        let path = IdentityPath::user(operator, account, user);
        path.validate()?;
        let _guard = self.writes.lock().await;

        if !self.issues.exists(&path).await? {
            tracing::debug!(path = %path, "No user issue to delete");
            return Ok(());
        }

        self.nkeys.delete(&path).await?;
        self.jwts.delete(&path).await?;
        self.issues.delete(&path).await?;

        tracing::info!(path = %path, "Deleted user");
        Ok(())
    }

    /// The `.creds` document of an issued user.
    pub async fn read_user_creds(&self, operator: &str, account: &str, user: &str) -> Result<String> {
        let path = IdentityPath::user(operator, account, user);
        path.validate()?;

        let jwt = self
            .jwts
            .get(&path)
            .await?
            .ok_or_else(|| EngineError::not_found("user token", path.to_string()))?;
        let key_pair = self
            .nkeys
            .read(&path)
            .await?
            .ok_or_else(|| EngineError::not_found("user key pair", path.to_string()))?;

        Ok(format_user_creds(&jwt, key_pair.seed()))
    }

    async fn user_view(&self, issue: UserIssue) -> Result<UserIssueView> {
        let status = self.identity_status(&issue.path()).await?;
        Ok(IssueView { issue, status })
    }

    // -------------------------------------------------------------------------
    // Key pairs and tokens
    // -------------------------------------------------------------------------

    pub async fn read_nkey(&self, path: &IdentityPath) -> Result<Option<KeyPair>> {
        path.validate()?;
        self.nkeys.read(path).await
    }

    /// Store a seed at `path`, replacing any existing one.
    ///
    /// Imported signing keys are also added to their owner's record so the
    /// next issue embeds them; a failure of that step is only logged.
    pub async fn import_nkey(&self, path: &IdentityPath, seed: &str) -> Result<KeyPair> {
        path.validate()?;
        let _guard = self.writes.lock().await;

        let key_pair = self.nkeys.import(path, seed).await?;
        if path.role().is_signing() {
            if let Err(e) = self.register_signing_key(path).await {
                tracing::warn!(path = %path, error = %e, "Could not register imported signing key");
            }
        }
        Ok(key_pair)
    }

    pub async fn delete_nkey(&self, path: &IdentityPath) -> Result<()> {
        path.validate()?;
        let _guard = self.writes.lock().await;
        self.nkeys.delete(path).await
    }

    pub async fn list_nkeys(&self, listing: &Listing) -> Result<Vec<String>> {
        self.nkeys.list(listing).await
    }

    pub async fn read_jwt(&self, path: &IdentityPath) -> Result<Option<String>> {
        path.validate()?;
        self.jwts.get(path).await
    }

    /// Verify and store a token issued elsewhere.
    pub async fn import_jwt(&self, path: &IdentityPath, token: &str) -> Result<DecodedClaims> {
        path.validate()?;
        let _guard = self.writes.lock().await;
        self.jwts.put(path, token).await
    }

    pub async fn delete_jwt(&self, path: &IdentityPath) -> Result<()> {
        path.validate()?;
        let _guard = self.writes.lock().await;
        self.jwts.delete(path).await
    }

    pub async fn list_jwts(&self, listing: &Listing) -> Result<Vec<String>> {
        self.jwts.list(listing).await
    }

    async fn register_signing_key(&self, path: &IdentityPath) -> Result<()> {
        match path {
            IdentityPath::OperatorSigningKey { operator, key } => {
                let owner = IdentityPath::operator(operator.clone());
                let mut issue = self
                    .issues
                    .get::<OperatorIssue>(&owner)
                    .await?
                    .unwrap_or_else(|| OperatorIssue::minimal(operator));
                if issue.signing_keys.insert(key.clone()) {
                    self.issues.put(&owner, &issue).await?;
                    tracing::info!(path = %path, "Registered signing key with operator issue");
                }
            }
            IdentityPath::AccountSigningKey {
                operator,
                account,
                key,
            } => {
                let owner = IdentityPath::account(operator.clone(), account.clone());
                let mut issue = self
                    .issues
                    .get::<AccountIssue>(&owner)
                    .await?
                    .unwrap_or_else(|| AccountIssue::minimal(operator, account));
                if issue.signing_keys.insert(key.clone()) {
                    self.issues.put(&owner, &issue).await?;
                    tracing::info!(path = %path, "Registered signing key with account issue");
                }
            }
            _ => {}
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Control plane
    // -------------------------------------------------------------------------

    /// Push the stored token of an account to the operator's cluster.
    pub async fn push_account(&self, operator: &str, account: &str) -> Result<SyncReport> {
        validate_segment("operator", operator)?;
        validate_segment("account", account)?;
        let operator_issue = self.require_operator(operator).await?;

        let path = IdentityPath::account(operator, account);
        let token = self
            .jwts
            .get(&path)
            .await?
            .ok_or_else(|| EngineError::not_found("account token", path.to_string()))?;

        let result = self.push_token(&operator_issue, &token).await;
        self.record_sync(
            &path,
            match &result {
                Ok(report) => SyncOutcome::completed(report.clone()),
                Err(e) => SyncOutcome::failed(e),
            },
        );
        result
    }

    /// Revoke accounts on the operator's cluster. Each entry is an account
    /// public key or the name of an account with a stored key pair.
    pub async fn revoke_accounts(&self, operator: &str, accounts: &[String]) -> Result<SyncReport> {
        validate_segment("operator", operator)?;
        if accounts.is_empty() {
            return Err(EngineError::validation("accounts", "at least one account is required"));
        }
        let operator_issue = self.require_operator(operator).await?;

        let mut public_keys = Vec::with_capacity(accounts.len());
        for account in accounts {
            if validate_public_key(account, Role::Account).is_ok() {
                public_keys.push(account.clone());
                continue;
            }
            validate_segment("account", account)?;
            let path = IdentityPath::account(operator, account.as_str());
            let key_pair = self
                .nkeys
                .read(&path)
                .await?
                .ok_or_else(|| EngineError::not_found("account key pair", path.to_string()))?;
            public_keys.push(key_pair.public_key());
        }

        self.revoke_keys(&operator_issue, &public_keys).await
    }

    async fn push_token(&self, operator: &OperatorIssue, token: &str) -> Result<SyncReport> {
        let plane = self.control_plane(operator).await?;
        Ok(plane.push(token).await?)
    }

    async fn revoke_keys(&self, operator: &OperatorIssue, public_keys: &[String]) -> Result<SyncReport> {
        let operator_path = operator.path();
        let operator_kp = self
            .nkeys
            .read(&operator_path)
            .await?
            .ok_or_else(|| EngineError::not_found("operator key pair", operator_path.to_string()))?;
        let plane = self.control_plane(operator).await?;
        Ok(plane.revoke(public_keys, &operator_kp).await?)
    }

    /// Control plane authenticated as the operator's push user.
    async fn control_plane(&self, operator: &OperatorIssue) -> Result<ControlPlane> {
        let url = operator.sync.target().ok_or_else(|| {
            EngineError::validation(
                "sync",
                format!("sync is not enabled for operator {}", operator.operator),
            )
        })?;

        let user_path = operator.push_user_path();
        let key_pair = self
            .nkeys
            .read(&user_path)
            .await?
            .ok_or_else(|| EngineError::not_found("push user key pair", user_path.to_string()))?;
        let jwt = self
            .jwts
            .get(&user_path)
            .await?
            .ok_or_else(|| EngineError::not_found("push user token", user_path.to_string()))?;

        let key = ConnectionKey {
            operator: operator.operator.clone(),
            url: url.to_string(),
        };
        Ok(self
            .clients
            .control_plane(&key, &UserCredentials { jwt, key_pair })
            .await?)
    }

    async fn syncing_operator(&self, operator: &str) -> Result<Option<OperatorIssue>> {
        let issue: Option<OperatorIssue> = self.issues.get(&IdentityPath::operator(operator)).await?;
        Ok(issue.filter(|i| i.sync.target().is_some()))
    }

    async fn require_operator(&self, operator: &str) -> Result<OperatorIssue> {
        let path = IdentityPath::operator(operator);
        self.issues
            .get(&path)
            .await?
            .ok_or_else(|| EngineError::not_found("operator issue", path.to_string()))
    }

    fn record_sync(&self, path: &IdentityPath, outcome: SyncOutcome) {
        if let Ok(mut outcomes) = self.sync_outcomes.write() {
            outcomes.insert(path.to_string(), outcome);
        }
    }

    fn forget_sync(&self, path: &IdentityPath) {
        if let Ok(mut outcomes) = self.sync_outcomes.write() {
            outcomes.remove(&path.to_string());
        }
    }

    fn last_sync(&self, path: &IdentityPath) -> Option<SyncOutcome> {
        self.sync_outcomes
            .read()
            .ok()
            .and_then(|outcomes| outcomes.get(&path.to_string()).cloned())
    }

    // -------------------------------------------------------------------------
    // Shared steps
    // -------------------------------------------------------------------------

    async fn remove_signing_keys<'a>(
        &self,
        owner: &IdentityPath,
        removed: impl Iterator<Item = &'a String>,
    ) -> Result<()> {
        for key in removed {
            if let Some(path) = owner.signing_key(key.as_str()) {
                self.nkeys.delete(&path).await?;
                tracing::info!(path = %path, "Removed signing key");
            }
        }
        Ok(())
    }

    /// Ensure every signing key pair exists and return their public keys.
    async fn ensure_signing_keys(
        &self,
        paths: impl Iterator<Item = IdentityPath>,
    ) -> Result<Vec<String>> {
        let mut public_keys = BTreeSet::new();
        for path in paths {
            public_keys.insert(self.nkeys.ensure(&path, None).await?.public_key());
        }
        Ok(public_keys.into_iter().collect())
    }

    /// The key pair that signs the identity at `path`: the parent's signing
    /// key `use_signing_key` when given, the parent's own key otherwise.
    async fn resolve_signer(
        &self,
        path: &IdentityPath,
        use_signing_key: Option<&str>,
    ) -> Result<KeyPair> {
        let Some(key) = use_signing_key else {
            return self.parent_key(path).await;
        };

        let signing_path = path
            .parent()
            .and_then(|parent| parent.signing_key(key))
            .ok_or_else(|| {
                EngineError::validation("use_signing_key", format!("{path} has no signing parent"))
            })?;
        self.nkeys
            .read(&signing_path)
            .await?
            .ok_or_else(|| EngineError::SigningKeyNotFound {
                path: signing_path.to_string(),
            })
    }

    async fn parent_key(&self, path: &IdentityPath) -> Result<KeyPair> {
        let parent = path.parent().ok_or_else(|| {
            EngineError::validation("path", format!("{path} has no parent"))
        })?;
        self.nkeys
            .read(&parent)
            .await?
            .ok_or_else(|| EngineError::ParentNotFound {
                path: parent.to_string(),
            })
    }

    async fn identity_status(&self, path: &IdentityPath) -> Result<IdentityStatus> {
        Ok(IdentityStatus {
            nkey: self.nkeys.exists(path).await?,
            jwt: self.jwts.exists(path).await?,
        })
    }
}
