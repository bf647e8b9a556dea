//! Error types for the engine.

use thiserror::Error;
use warden_core::{IdentityPath, PathError, Role};
use warden_jwt::{ClaimType, JwtError};
use warden_store::StorageError;
use warden_sync::SyncError;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Parameters were rejected before any state change.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A record the operation needs does not exist.
    #[error("{kind} not found at {path}")]
    NotFound { kind: &'static str, path: String },

    /// The key pair of the identity that signs for this one is missing.
    #[error("parent key pair not found at {path}")]
    ParentNotFound { path: String },

    /// The designated signing key pair is missing.
    #[error("signing key not found at {path}")]
    SigningKeyNotFound { path: String },

    /// A seed belongs to another role than the path it is stored at.
    #[error("seed at {path} is not a {expected} seed")]
    WrongSeedType { path: String, expected: Role },

    /// A token carries another claim type than the path expects.
    #[error("token for {path} carries {found} claims, expected {expected}")]
    WrongClaimType {
        path: String,
        expected: ClaimType,
        found: ClaimType,
    },

    /// Key or token handling failed.
    #[error("signing error: {0}")]
    Signing(#[from] JwtError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Control-plane error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}

impl EngineError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, path: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            path: path.into(),
        }
    }

    /// Attach `path` to key and token errors that are about its content.
    pub(crate) fn at(path: &IdentityPath, err: JwtError) -> Self {
        match err {
            JwtError::WrongSeedType { expected, .. } => Self::WrongSeedType {
                path: path.to_string(),
                expected,
            },
            JwtError::WrongClaimType { expected, found } => Self::WrongClaimType {
                path: path.to_string(),
                expected,
                found,
            },
            other => Self::Signing(other),
        }
    }
}

impl From<PathError> for EngineError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::EmptySegment { field } | PathError::InvalidSegment { field, .. } => {
                Self::validation(field, err.to_string())
            }
            other => Self::validation("path", other.to_string()),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
