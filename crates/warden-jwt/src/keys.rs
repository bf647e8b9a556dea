//! NKey pair management.
//!
//! An NKey seed is 32 random bytes encoded in base32 together with a role
//! prefix and a CRC16 checksum. Seeds start with `S` followed by the role
//! character (`SO` operator, `SA` account, `SU` user), public keys start with
//! the role character alone.

use crate::error::JwtError;
use crc::{CRC_16_XMODEM, Crc};
use data_encoding::BASE32_NOPAD;
use nkeys::{KeyPair as NkeyPair, KeyPairType};
use std::fmt;
use std::sync::Arc;
use warden_core::Role;

/// Prefix byte of encoded private keys (`P`).
const PREFIX_BYTE_PRIVATE: u8 = 15 << 3;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

fn key_pair_type(role: Role) -> KeyPairType {
    match role {
        Role::Operator | Role::OperatorSigning => KeyPairType::Operator,
        Role::Account | Role::AccountSigning => KeyPairType::Account,
        Role::User => KeyPairType::User,
    }
}

/// A role-tagged NKey pair.
#[derive(Clone)]
pub struct KeyPair {
    role: Role,
    seed: String,
    inner: Arc<NkeyPair>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("role", &self.role)
            .field("public_key", &self.inner.public_key())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a new random keypair for `role`.
    pub fn generate(role: Role) -> Result<Self, JwtError> {
        let inner = NkeyPair::new(key_pair_type(role));
        let seed = inner
            .seed()
            .map_err(|e| JwtError::KeyGenerationFailed(e.to_string()))?;

        Ok(Self {
            role,
            seed,
            inner: Arc::new(inner),
        })
    }

    /// Load a keypair from an encoded seed, rejecting seeds of another role.
    pub fn from_seed(seed: &str, role: Role) -> Result<Self, JwtError> {
        let seed = seed.trim();
        let inner = decode_seed(seed)?;
        check_prefix(&inner.public_key(), role)?;

        Ok(Self {
            role,
            seed: seed.to_string(),
            inner: Arc::new(inner),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The encoded seed.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// The encoded public key.
    pub fn public_key(&self) -> String {
        self.inner.public_key()
    }

    /// The encoded private key (`P` prefix, seed followed by public key bytes).
    pub fn private_key(&self) -> Result<String, JwtError> {
        let raw_seed = raw_seed_bytes(&self.seed)?;
        let raw_public = raw_public_bytes(&self.public_key())?;

        let mut raw = Vec::with_capacity(1 + raw_seed.len() + raw_public.len() + 2);
        raw.push(PREFIX_BYTE_PRIVATE);
        raw.extend_from_slice(&raw_seed);
        raw.extend_from_slice(&raw_public);
        let checksum = CRC16.checksum(&raw);
        raw.extend_from_slice(&checksum.to_le_bytes());

        Ok(BASE32_NOPAD.encode(&raw))
    }

    /// Sign arbitrary bytes.
    pub fn sign(&self, input: &[u8]) -> Result<Vec<u8>, JwtError> {
        self.inner
            .sign(input)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }
}

/// Check that `seed` is a valid seed for `role`.
pub fn validate_seed(seed: &str, role: Role) -> Result<(), JwtError> {
    let inner = decode_seed(seed.trim())?;
    check_prefix(&inner.public_key(), role)
}

/// Check that `public_key` is a valid public key for `role`.
pub fn validate_public_key(public_key: &str, role: Role) -> Result<(), JwtError> {
    NkeyPair::from_public_key(public_key)
        .map_err(|e| JwtError::InvalidPublicKey(e.to_string()))?;
    if public_key.starts_with(role.public_key_prefix()) {
        Ok(())
    } else {
        Err(JwtError::InvalidPublicKey(format!(
            "expected {} public key, got {}",
            role,
            describe_prefix(public_key)
        )))
    }
}

/// Verify an ed25519 signature made by the holder of `public_key`.
pub fn verify_signature(public_key: &str, input: &[u8], signature: &[u8]) -> Result<(), JwtError> {
    let verifier = NkeyPair::from_public_key(public_key)
        .map_err(|e| JwtError::InvalidPublicKey(e.to_string()))?;
    verifier
        .verify(input, signature)
        .map_err(|e| JwtError::InvalidSignature(e.to_string()))
}

fn decode_seed(seed: &str) -> Result<NkeyPair, JwtError> {
    if !seed.starts_with('S') {
        return Err(JwtError::InvalidSeed("seed must start with 'S'".to_string()));
    }
    NkeyPair::from_seed(seed).map_err(|e| JwtError::InvalidSeed(e.to_string()))
}

fn check_prefix(public_key: &str, role: Role) -> Result<(), JwtError> {
    if public_key.starts_with(role.public_key_prefix()) {
        Ok(())
    } else {
        Err(JwtError::WrongSeedType {
            expected: role,
            found: describe_prefix(public_key).to_string(),
        })
    }
}

fn describe_prefix(public_key: &str) -> &'static str {
    match public_key.chars().next() {
        Some('O') => "operator",
        Some('A') => "account",
        Some('U') => "user",
        Some('N') => "server",
        Some('C') => "cluster",
        Some('X') => "curve",
        _ => "unknown",
    }
}

/// Raw 32 seed bytes of an encoded seed (two prefix bytes, payload, CRC16).
fn raw_seed_bytes(seed: &str) -> Result<[u8; 32], JwtError> {
    let decoded = BASE32_NOPAD
        .decode(seed.as_bytes())
        .map_err(|e| JwtError::InvalidSeed(e.to_string()))?;
    if decoded.len() != 36 {
        return Err(JwtError::InvalidSeed(format!(
            "unexpected seed length {}",
            decoded.len()
        )));
    }
    let mut raw = [0u8; 32];
    raw.copy_from_slice(&decoded[2..34]);
    Ok(raw)
}

/// Raw 32 key bytes of an encoded public key (prefix byte, payload, CRC16).
fn raw_public_bytes(public_key: &str) -> Result<[u8; 32], JwtError> {
    let decoded = BASE32_NOPAD
        .decode(public_key.as_bytes())
        .map_err(|e| JwtError::InvalidPublicKey(e.to_string()))?;
    if decoded.len() != 35 {
        return Err(JwtError::InvalidPublicKey(format!(
            "unexpected public key length {}",
            decoded.len()
        )));
    }
    let mut raw = [0u8; 32];
    raw.copy_from_slice(&decoded[1..33]);
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let keypair = KeyPair::generate(Role::Operator).unwrap();
        assert!(keypair.seed().starts_with("SO"));
        assert!(keypair.public_key().starts_with('O'));
        assert_eq!(keypair.role(), Role::Operator);
    }

    #[test]
    fn test_keypair_roundtrip() {
        let keypair1 = KeyPair::generate(Role::Account).unwrap();
        let keypair2 = KeyPair::from_seed(keypair1.seed(), Role::Account).unwrap();

        assert_eq!(keypair1.public_key(), keypair2.public_key());
        assert_eq!(
            keypair1.private_key().unwrap(),
            keypair2.private_key().unwrap()
        );
    }

    #[test]
    fn test_private_key_encoding() {
        let keypair = KeyPair::generate(Role::User).unwrap();
        let private_key = keypair.private_key().unwrap();

        assert!(private_key.starts_with('P'));
        let decoded = BASE32_NOPAD.decode(private_key.as_bytes()).unwrap();
        assert_eq!(decoded.len(), 67);
        assert_eq!(&decoded[33..65], &raw_public_bytes(&keypair.public_key()).unwrap());
    }

    #[test]
    fn test_signing_keys_share_parent_prefix() {
        let operator_signing = KeyPair::generate(Role::OperatorSigning).unwrap();
        assert!(operator_signing.public_key().starts_with('O'));
        assert!(validate_seed(operator_signing.seed(), Role::Operator).is_ok());

        let account_signing = KeyPair::generate(Role::AccountSigning).unwrap();
        assert!(account_signing.seed().starts_with("SA"));
    }

    #[test]
    fn test_validate_seed_rejects_other_roles() {
        let keypair = KeyPair::generate(Role::User).unwrap();
        assert!(validate_seed(keypair.seed(), Role::User).is_ok());

        for role in [Role::Operator, Role::Account, Role::AccountSigning] {
            let err = validate_seed(keypair.seed(), role).unwrap_err();
            assert!(matches!(err, JwtError::WrongSeedType { .. }));
        }
    }

    #[test]
    fn test_invalid_seed() {
        assert!(matches!(
            KeyPair::from_seed("not-a-seed", Role::User),
            Err(JwtError::InvalidSeed(_))
        ));

        // A public key is not a seed
        let keypair = KeyPair::generate(Role::User).unwrap();
        assert!(KeyPair::from_seed(&keypair.public_key(), Role::User).is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = KeyPair::generate(Role::Operator).unwrap();
        let signature = keypair.sign(b"nonce").unwrap();

        verify_signature(&keypair.public_key(), b"nonce", &signature).unwrap();
        assert!(verify_signature(&keypair.public_key(), b"other", &signature).is_err());
    }

    #[test]
    fn test_validate_public_key() {
        let keypair = KeyPair::generate(Role::Account).unwrap();
        assert!(validate_public_key(&keypair.public_key(), Role::Account).is_ok());
        assert!(validate_public_key(&keypair.public_key(), Role::User).is_err());
        assert!(validate_public_key("AXXXX", Role::Account).is_err());
    }
}
