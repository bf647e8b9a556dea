//! Claims carried in NATS tokens.
//!
//! Every token shares the [`Claims`] envelope; the `nats` member holds a
//! [`NatsPayload`] whose body depends on the claim type. Fields the engine
//! does not interpret (limits, imports, exports, permissions, ...) are kept in
//! the `extra` map of each body and copied verbatim into the signed token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use warden_core::Role;

/// Claims format version written into every payload.
pub const CLAIMS_VERSION: u8 = 2;

/// The closed set of claim types the engine issues or understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Operator,
    Account,
    User,
    Generic,
}

impl ClaimType {
    /// The claim type stored for identities of `role`; signing keys have none.
    pub fn for_role(role: Role) -> Option<Self> {
        match role {
            Role::Operator => Some(Self::Operator),
            Role::Account => Some(Self::Account),
            Role::User => Some(Self::User),
            Role::OperatorSigning | Role::AccountSigning => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::Account => "account",
            Self::User => "user",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard claims envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims<T> {
    /// Token identifier, a hash of the claims.
    #[serde(default)]
    pub jti: String,

    /// Issued at (unix seconds).
    pub iat: i64,

    /// Public key of the signer.
    pub iss: String,

    /// Human readable name of the subject.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Public key of the identity described by the token.
    pub sub: String,

    /// Expiry (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Not valid before (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    pub nats: NatsPayload<T>,
}

/// The `nats` member of a token: a typed body plus type and version tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsPayload<T> {
    #[serde(flatten)]
    pub body: T,

    #[serde(rename = "type")]
    pub kind: ClaimType,

    #[serde(default = "default_version")]
    pub version: u8,
}

impl<T> NatsPayload<T> {
    pub fn new(kind: ClaimType, body: T) -> Self {
        Self {
            body,
            kind,
            version: CLAIMS_VERSION,
        }
    }
}

fn default_version() -> u8 {
    CLAIMS_VERSION
}

/// Operator token body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorClaims {
    /// Public keys allowed to sign account tokens on behalf of the operator.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signing_keys: Vec<String>,

    /// URL of the account server (resolver) nodes push to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_server_url: Option<String>,

    /// Client URLs of the operator's servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operator_service_urls: Vec<String>,

    /// Public key of the system account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_account: Option<String>,

    /// Minimum server version the operator requires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert_server_version: Option<String>,

    /// Reject account tokens signed with the operator's main key.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict_signing_key_usage: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Account token body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountClaims {
    /// Public keys allowed to sign user tokens on behalf of the account.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signing_keys: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Limits, imports, exports, default permissions, mappings, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User token body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Public key of the account when the token is signed by one of its
    /// signing keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_account: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Publish/subscribe permissions, limits, bearer flag, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Generic token body (control-plane requests).
pub type GenericClaims = Map<String, Value>;

/// A verified token decoded into its claim variant.
#[derive(Debug, Clone)]
pub enum DecodedClaims {
    Operator(Claims<OperatorClaims>),
    Account(Claims<AccountClaims>),
    User(Claims<UserClaims>),
    Generic(Claims<GenericClaims>),
}

impl DecodedClaims {
    pub fn claim_type(&self) -> ClaimType {
        match self {
            Self::Operator(_) => ClaimType::Operator,
            Self::Account(_) => ClaimType::Account,
            Self::User(_) => ClaimType::User,
            Self::Generic(_) => ClaimType::Generic,
        }
    }

    /// Public key of the identity the token describes.
    pub fn subject(&self) -> &str {
        match self {
            Self::Operator(c) => &c.sub,
            Self::Account(c) => &c.sub,
            Self::User(c) => &c.sub,
            Self::Generic(c) => &c.sub,
        }
    }

    /// Public key of the signer.
    pub fn issuer(&self) -> &str {
        match self {
            Self::Operator(c) => &c.iss,
            Self::Account(c) => &c.iss,
            Self::User(c) => &c.iss,
            Self::Generic(c) => &c.iss,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Operator(c) => &c.name,
            Self::Account(c) => &c.name,
            Self::User(c) => &c.name,
            Self::Generic(c) => &c.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_serializes_type_and_version() {
        let payload = NatsPayload::new(
            ClaimType::Account,
            AccountClaims {
                signing_keys: vec!["AKEY".to_string()],
                ..Default::default()
            },
        );

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "account");
        assert_eq!(value["version"], 2);
        assert_eq!(value["signing_keys"], json!(["AKEY"]));
    }

    #[test]
    fn test_pass_through_fields_preserved() {
        let value = json!({
            "limits": { "conn": 10, "subs": -1 },
            "exports": [{ "name": "svc", "subject": "svc.>", "type": "service" }],
            "description": "tenant a",
            "type": "account",
            "version": 2
        });

        let payload: NatsPayload<AccountClaims> = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(payload.kind, ClaimType::Account);
        assert_eq!(payload.body.description.as_deref(), Some("tenant a"));
        assert_eq!(payload.body.extra["limits"]["conn"], 10);
        assert!(!payload.body.extra.contains_key("type"));

        assert_eq!(serde_json::to_value(&payload).unwrap(), value);
    }

    #[test]
    fn test_claim_type_for_role() {
        assert_eq!(ClaimType::for_role(Role::User), Some(ClaimType::User));
        assert_eq!(ClaimType::for_role(Role::OperatorSigning), None);
    }
}
