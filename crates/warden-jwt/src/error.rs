//! Error types for the JWT crate.

use crate::claims::ClaimType;
use thiserror::Error;
use warden_core::Role;

/// Errors that can occur during key and token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Failed to generate keypair.
    #[error("failed to generate keypair: {0}")]
    KeyGenerationFailed(String),

    /// The seed could not be decoded.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// The seed decodes, but belongs to another role.
    #[error("wrong seed type: expected {expected} seed, got {found}")]
    WrongSeedType { expected: Role, found: String },

    /// Failed to parse public key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Failed to sign data.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Failed to parse token.
    #[error("failed to parse token: {0}")]
    TokenParseFailed(String),

    /// The token signature does not match its issuer.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    /// The token decodes to a different claim type than required.
    #[error("wrong claim type: expected {expected}, got {found}")]
    WrongClaimType { expected: ClaimType, found: ClaimType },

    /// Failed to serialize/deserialize claims.
    #[error("claims serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
