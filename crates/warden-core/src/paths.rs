//! Identity path grammar.
//!
//! Every identity lives at a relative path such as
//! `operator/op1/account/acc1/user/alice`. The same relative path is stored
//! under several category prefixes (`nkey/`, `jwt/`, `issue/`), so the
//! grammar is the stable storage key scheme of the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while building or parsing identity paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    /// A path segment was empty.
    #[error("{field} must not be empty")]
    EmptySegment { field: &'static str },

    /// A path segment contained a separator or whitespace.
    #[error("{field} contains invalid characters: {value:?}")]
    InvalidSegment { field: &'static str, value: String },

    /// The string does not follow the identity path grammar.
    #[error("malformed identity path: {0}")]
    Malformed(String),

    /// Unknown category prefix.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Cryptographic role of a key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Operator,
    OperatorSigning,
    Account,
    AccountSigning,
    User,
}

impl Role {
    /// The role name as used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::OperatorSigning => "operator-signing",
            Self::Account => "account",
            Self::AccountSigning => "account-signing",
            Self::User => "user",
        }
    }

    /// Whether this is a signing-key variant.
    pub fn is_signing(&self) -> bool {
        matches!(self, Self::OperatorSigning | Self::AccountSigning)
    }

    /// The prefix character of public keys for this role.
    ///
    /// Signing keys share the prefix of the identity they sign for.
    pub fn public_key_prefix(&self) -> char {
        match self {
            Self::Operator | Self::OperatorSigning => 'O',
            Self::Account | Self::AccountSigning => 'A',
            Self::User => 'U',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage category under which an identity path is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Nkey,
    Jwt,
    Issue,
}

impl Category {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Nkey => "nkey",
            Self::Jwt => "jwt",
            Self::Issue => "issue",
        }
    }
}

impl FromStr for Category {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nkey" => Ok(Self::Nkey),
            "jwt" => Ok(Self::Jwt),
            "issue" => Ok(Self::Issue),
            other => Err(PathError::UnknownCategory(other.to_string())),
        }
    }
}

/// Check that a single path segment is usable as a storage key component.
pub fn validate_segment(field: &'static str, value: &str) -> Result<(), PathError> {
    if value.is_empty() {
        return Err(PathError::EmptySegment { field });
    }
    if value == "."
        || value == ".."
        || value.contains('/')
        || value.chars().any(char::is_whitespace)
    {
        return Err(PathError::InvalidSegment {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// The relative path of one identity in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityPath {
    Operator {
        operator: String,
    },
    OperatorSigningKey {
        operator: String,
        key: String,
    },
    Account {
        operator: String,
        account: String,
    },
    AccountSigningKey {
        operator: String,
        account: String,
        key: String,
    },
    User {
        operator: String,
        account: String,
        user: String,
    },
}

impl IdentityPath {
    pub fn operator(operator: impl Into<String>) -> Self {
        Self::Operator {
            operator: operator.into(),
        }
    }

    pub fn operator_signing_key(operator: impl Into<String>, key: impl Into<String>) -> Self {
        Self::OperatorSigningKey {
            operator: operator.into(),
            key: key.into(),
        }
    }

    pub fn account(operator: impl Into<String>, account: impl Into<String>) -> Self {
        Self::Account {
            operator: operator.into(),
            account: account.into(),
        }
    }

    pub fn account_signing_key(
        operator: impl Into<String>,
        account: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::AccountSigningKey {
            operator: operator.into(),
            account: account.into(),
            key: key.into(),
        }
    }

    pub fn user(
        operator: impl Into<String>,
        account: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self::User {
            operator: operator.into(),
            account: account.into(),
            user: user.into(),
        }
    }

    /// Role of the key pair stored at this path.
    pub fn role(&self) -> Role {
        match self {
            Self::Operator { .. } => Role::Operator,
            Self::OperatorSigningKey { .. } => Role::OperatorSigning,
            Self::Account { .. } => Role::Account,
            Self::AccountSigningKey { .. } => Role::AccountSigning,
            Self::User { .. } => Role::User,
        }
    }

    /// The last segment of the path.
    pub fn name(&self) -> &str {
        match self {
            Self::Operator { operator } => operator,
            Self::OperatorSigningKey { key, .. } => key,
            Self::Account { account, .. } => account,
            Self::AccountSigningKey { key, .. } => key,
            Self::User { user, .. } => user,
        }
    }

    /// The operator at the root of this path.
    pub fn operator_name(&self) -> &str {
        match self {
            Self::Operator { operator }
            | Self::OperatorSigningKey { operator, .. }
            | Self::Account { operator, .. }
            | Self::AccountSigningKey { operator, .. }
            | Self::User { operator, .. } => operator,
        }
    }

    /// The identity that owns or signs for this one.
    ///
    /// Signing keys belong to their identity, accounts to their operator and
    /// users to their account. Operators have no parent.
    pub fn parent(&self) -> Option<IdentityPath> {
        match self {
            Self::Operator { .. } => None,
            Self::OperatorSigningKey { operator, .. } | Self::Account { operator, .. } => {
                Some(Self::operator(operator.clone()))
            }
            Self::AccountSigningKey {
                operator, account, ..
            }
            | Self::User {
                operator, account, ..
            } => Some(Self::account(operator.clone(), account.clone())),
        }
    }

    /// Path of this identity's signing key `key`. Only operators and
    /// accounts have signing keys.
    pub fn signing_key(&self, key: impl Into<String>) -> Option<IdentityPath> {
        match self {
            Self::Operator { operator } => Some(Self::operator_signing_key(operator.clone(), key)),
            Self::Account { operator, account } => Some(Self::account_signing_key(
                operator.clone(),
                account.clone(),
                key,
            )),
            _ => None,
        }
    }

    /// Validate every segment of the path.
    pub fn validate(&self) -> Result<(), PathError> {
        match self {
            Self::Operator { operator } => validate_segment("operator", operator),
            Self::OperatorSigningKey { operator, key } => {
                validate_segment("operator", operator)?;
                validate_segment("signing key", key)
            }
            Self::Account { operator, account } => {
                validate_segment("operator", operator)?;
                validate_segment("account", account)
            }
            Self::AccountSigningKey {
                operator,
                account,
                key,
            } => {
                validate_segment("operator", operator)?;
                validate_segment("account", account)?;
                validate_segment("signing key", key)
            }
            Self::User {
                operator,
                account,
                user,
            } => {
                validate_segment("operator", operator)?;
                validate_segment("account", account)?;
                validate_segment("user", user)
            }
        }
    }

    /// The full storage key of this identity in a category.
    pub fn in_category(&self, category: Category) -> String {
        format!("{}/{}", category.prefix(), self)
    }

    /// Parse a category-prefixed storage key such as `jwt/operator/op1`.
    pub fn parse_with_category(s: &str) -> Result<(Category, IdentityPath), PathError> {
        let (category, rest) = s
            .split_once('/')
            .ok_or_else(|| PathError::Malformed(s.to_string()))?;
        Ok((category.parse()?, rest.parse()?))
    }
}

impl fmt::Display for IdentityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator { operator } => write!(f, "operator/{operator}"),
            Self::OperatorSigningKey { operator, key } => {
                write!(f, "operator/{operator}/signing/{key}")
            }
            Self::Account { operator, account } => {
                write!(f, "operator/{operator}/account/{account}")
            }
            Self::AccountSigningKey {
                operator,
                account,
                key,
            } => write!(f, "operator/{operator}/account/{account}/signing/{key}"),
            Self::User {
                operator,
                account,
                user,
            } => write!(f, "operator/{operator}/account/{account}/user/{user}"),
        }
    }
}

impl FromStr for IdentityPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.trim_matches('/').split('/').collect();
        let path = match segments.as_slice() {
            ["operator", op] => Self::operator(*op),
            ["operator", op, "signing", key] => Self::operator_signing_key(*op, *key),
            ["operator", op, "account", acc] => Self::account(*op, *acc),
            ["operator", op, "account", acc, "signing", key] => {
                Self::account_signing_key(*op, *acc, *key)
            }
            ["operator", op, "account", acc, "user", user] => Self::user(*op, *acc, *user),
            _ => return Err(PathError::Malformed(s.to_string())),
        };
        path.validate()?;
        Ok(path)
    }
}

/// A collection of sibling identities that can be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Operators,
    OperatorSigningKeys { operator: String },
    Accounts { operator: String },
    AccountSigningKeys { operator: String, account: String },
    Users { operator: String, account: String },
}

impl Listing {
    /// Storage prefix (with trailing `/`) whose immediate children are listed.
    pub fn prefix(&self, category: Category) -> String {
        let relative = match self {
            Self::Operators => "operator".to_string(),
            Self::OperatorSigningKeys { operator } => format!("operator/{operator}/signing"),
            Self::Accounts { operator } => format!("operator/{operator}/account"),
            Self::AccountSigningKeys { operator, account } => {
                format!("operator/{operator}/account/{account}/signing")
            }
            Self::Users { operator, account } => {
                format!("operator/{operator}/account/{account}/user")
            }
        };
        format!("{}/{}/", category.prefix(), relative)
    }
}

impl FromStr for Listing {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.trim_matches('/').split('/').collect();
        let listing = match segments.as_slice() {
            ["operator"] => Self::Operators,
            ["operator", op, "signing"] => Self::OperatorSigningKeys {
                operator: op.to_string(),
            },
            ["operator", op, "account"] => Self::Accounts {
                operator: op.to_string(),
            },
            ["operator", op, "account", acc, "signing"] => Self::AccountSigningKeys {
                operator: op.to_string(),
                account: acc.to_string(),
            },
            ["operator", op, "account", acc, "user"] => Self::Users {
                operator: op.to_string(),
                account: acc.to_string(),
            },
            _ => return Err(PathError::Malformed(s.to_string())),
        };
        Ok(listing)
    }
}
