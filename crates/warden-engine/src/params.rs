//! Issue parameters.
//!
//! Callers submit one of these structs per create or update. Unknown fields
//! are rejected while deserializing and [`validate`](OperatorIssueParams::validate)
//! runs before any state is touched.
//!
//! The `claims` members carry pass-through token content (limits, imports,
//! exports, permissions, ...) that is copied verbatim into the signed token.
//! Members the engine computes itself may not be supplied there.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use warden_core::validate_segment;

/// Name of the system account when none is given.
pub const DEFAULT_SYSTEM_ACCOUNT: &str = "SYS";

/// Token members derived from key material, never accepted as input.
const RESERVED_CLAIMS: &[&str] = &[
    "signing_keys",
    "system_account",
    "account_server_url",
    "issuer_account",
    "type",
    "version",
];

/// Pass-through operator token content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorClaimsInput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operator_service_urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert_server_version: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict_signing_key_usage: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pass-through account token content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountClaimsInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Limits, imports, exports, default permissions, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pass-through user token content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserClaimsInput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// `pub`/`sub` permissions, limits, bearer flag, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whether an operator pushes its accounts to a live cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSettings {
    /// Push account tokens on every account write and revoke on delete.
    #[serde(default)]
    pub enabled: bool,

    /// Cluster URL, such as `nats://127.0.0.1:4222`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_server_url: Option<String>,
}

impl SyncSettings {
    /// The cluster URL when pushing is enabled.
    pub fn target(&self) -> Option<&str> {
        self.account_server_url
            .as_deref()
            .filter(|_| self.enabled)
    }

    fn validate(&self) -> Result<()> {
        match self.account_server_url.as_deref() {
            Some(url) if !url.contains("://") => Err(EngineError::validation(
                "sync.account_server_url",
                format!("{url:?} is not a URL"),
            )),
            None if self.enabled => Err(EngineError::validation(
                "sync.account_server_url",
                "required when sync is enabled",
            )),
            _ => Ok(()),
        }
    }
}

/// Parameters of an operator issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorIssueParams {
    /// Identifiers of the operator's signing keys.
    #[serde(default)]
    pub signing_keys: BTreeSet<String>,

    #[serde(default = "default_system_account")]
    pub system_account: String,

    /// Create the system account's key pair and token with the operator.
    #[serde(default = "default_true")]
    pub create_system_account: bool,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub claims: OperatorClaimsInput,
}

impl Default for OperatorIssueParams {
    fn default() -> Self {
        Self {
            signing_keys: BTreeSet::new(),
            system_account: default_system_account(),
            create_system_account: true,
            sync: SyncSettings::default(),
            claims: OperatorClaimsInput::default(),
        }
    }
}

impl OperatorIssueParams {
    pub fn validate(&self) -> Result<()> {
        validate_signing_keys(&self.signing_keys)?;
        validate_segment("system_account", &self.system_account)?;
        self.sync.validate()?;
        validate_extra(&self.claims.extra)
    }
}

/// Parameters of an account issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountIssueParams {
    /// Sign with this operator signing key instead of the operator key.
    #[serde(default)]
    pub use_signing_key: Option<String>,

    /// Identifiers of the account's signing keys.
    #[serde(default)]
    pub signing_keys: BTreeSet<String>,

    #[serde(default)]
    pub claims: AccountClaimsInput,
}

impl AccountIssueParams {
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.use_signing_key {
            validate_segment("use_signing_key", key)?;
        }
        validate_signing_keys(&self.signing_keys)?;
        validate_extra(&self.claims.extra)
    }
}

/// Parameters of a user issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserIssueParams {
    /// Sign with this account signing key instead of the account key.
    #[serde(default)]
    pub use_signing_key: Option<String>,

    #[serde(default)]
    pub claims: UserClaimsInput,
}

impl UserIssueParams {
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.use_signing_key {
            validate_segment("use_signing_key", key)?;
        }
        validate_extra(&self.claims.extra)
    }
}

fn validate_signing_keys(keys: &BTreeSet<String>) -> Result<()> {
    for key in keys {
        validate_segment("signing_keys", key)?;
    }
    Ok(())
}

fn validate_extra(extra: &Map<String, Value>) -> Result<()> {
    match RESERVED_CLAIMS.iter().find(|name| extra.contains_key(**name)) {
        Some(name) => Err(EngineError::validation(
            format!("claims.{name}"),
            "computed by the engine and cannot be supplied",
        )),
        None => Ok(()),
    }
}

fn default_system_account() -> String {
    DEFAULT_SYSTEM_ACCOUNT.to_string()
}

fn default_true() -> bool {
    true
}
