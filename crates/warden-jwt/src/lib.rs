//! # warden-jwt
//!
//! NKey and NATS JWT handling for Warden.
//!
//! This crate provides functionality for:
//! - Generating and importing role-prefixed NKey pairs
//! - Validating that a seed belongs to the expected role
//! - Encoding and signing NATS v2 claims tokens
//! - Decoding and verifying tokens into one of the closed claim variants
//! - Rendering user `.creds` documents
//!
//! ## Token Layout
//!
//! | Segment | Content |
//! |---------|---------|
//! | header | `{"typ":"JWT","alg":"ed25519-nkey"}` |
//! | claims | `jti`, `iat`, `iss`, `name`, `sub`, `nats` payload |
//! | signature | ed25519 signature of `header.claims` by the issuer key |
//!
//! All three segments are base64url encoded without padding.

pub mod claims;
pub mod creds;
pub mod error;
pub mod keys;
pub mod token;

pub use claims::{
    AccountClaims, ClaimType, Claims, DecodedClaims, GenericClaims, NatsPayload, OperatorClaims,
    UserClaims,
};
pub use creds::format_user_creds;
pub use error::JwtError;
pub use keys::{KeyPair, validate_public_key, validate_seed};
pub use token::{TokenBuilder, TokenInfo, decode_as, decode_token, inspect_token_unverified};
