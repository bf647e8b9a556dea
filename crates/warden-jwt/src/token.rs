//! Token creation and verification.

use crate::claims::{
    AccountClaims, ClaimType, Claims, DecodedClaims, GenericClaims, NatsPayload, OperatorClaims,
    UserClaims,
};
use crate::error::JwtError;
use crate::keys::{KeyPair, verify_signature};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha512_256};

/// Token type written into every header.
pub const TOKEN_TYPE: &str = "JWT";

/// Signature algorithm of NATS v2 tokens.
pub const TOKEN_ALGORITHM: &str = "ed25519-nkey";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    typ: String,
    alg: String,
}

/// Builder for signed tokens.
///
/// The issuer of every token is the public key of the builder's keypair.
pub struct TokenBuilder {
    keypair: KeyPair,
}

impl TokenBuilder {
    /// Create a new token builder with the given signing keypair.
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Public key written as `iss`.
    pub fn issuer(&self) -> String {
        self.keypair.public_key()
    }

    /// Sign a token of `kind` describing `subject`.
    pub fn sign<T: Serialize>(
        &self,
        name: &str,
        subject: &str,
        kind: ClaimType,
        body: T,
    ) -> Result<String, JwtError> {
        let mut claims = Claims {
            jti: String::new(),
            iat: Utc::now().timestamp(),
            iss: self.issuer(),
            name: name.to_string(),
            sub: subject.to_string(),
            exp: None,
            nbf: None,
            aud: None,
            nats: NatsPayload::new(kind, body),
        };
        self.encode(&mut claims)
    }

    /// Encode prepared claims, assigning `iss` and `jti`.
    pub fn encode<T: Serialize>(&self, claims: &mut Claims<T>) -> Result<String, JwtError> {
        claims.iss = self.issuer();
        claims.jti = String::new();
        let unhashed = serde_json::to_vec(claims)?;
        claims.jti = BASE32_NOPAD.encode(&Sha512_256::digest(&unhashed));

        let header = serde_json::to_vec(&Header {
            typ: TOKEN_TYPE.to_string(),
            alg: TOKEN_ALGORITHM.to_string(),
        })?;
        let payload = serde_json::to_vec(claims)?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.keypair.sign(signing_input.as_bytes())?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }
}

struct RawToken<'a> {
    header: Header,
    payload: Value,
    signing_input: &'a str,
    signature: Vec<u8>,
}

fn split_token(token: &str) -> Result<RawToken<'_>, JwtError> {
    let token = token.trim();
    let (signing_input, signature) = token
        .rsplit_once('.')
        .ok_or_else(|| JwtError::TokenParseFailed("expected three segments".to_string()))?;
    let (header, payload) = signing_input
        .split_once('.')
        .ok_or_else(|| JwtError::TokenParseFailed("expected three segments".to_string()))?;
    if payload.contains('.') {
        return Err(JwtError::TokenParseFailed(
            "expected three segments".to_string(),
        ));
    }

    let header: Header = serde_json::from_slice(&decode_segment("header", header)?)?;
    let payload: Value = serde_json::from_slice(&decode_segment("claims", payload)?)?;
    let signature = decode_segment("signature", signature)?;

    Ok(RawToken {
        header,
        payload,
        signing_input,
        signature,
    })
}

fn decode_segment(segment: &str, encoded: &str) -> Result<Vec<u8>, JwtError> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| JwtError::TokenParseFailed(format!("{segment}: {e}")))
}

fn claim_type_of(payload: &Value) -> Result<ClaimType, JwtError> {
    let kind = payload
        .get("nats")
        .and_then(|nats| nats.get("type"))
        .cloned()
        .ok_or_else(|| JwtError::TokenParseFailed("missing nats.type".to_string()))?;
    serde_json::from_value(kind).map_err(|e| JwtError::TokenParseFailed(e.to_string()))
}

/// Decode a token, verify its signature against its issuer and return the
/// typed claims.
pub fn decode_token(token: &str) -> Result<DecodedClaims, JwtError> {
    let raw = split_token(token)?;

    if raw.header.typ.to_uppercase() != TOKEN_TYPE {
        return Err(JwtError::TokenParseFailed(format!(
            "unsupported token type {:?}",
            raw.header.typ
        )));
    }
    if raw.header.alg != TOKEN_ALGORITHM {
        return Err(JwtError::TokenParseFailed(format!(
            "unsupported algorithm {:?}",
            raw.header.alg
        )));
    }

    let issuer = raw
        .payload
        .get("iss")
        .and_then(Value::as_str)
        .ok_or_else(|| JwtError::TokenParseFailed("missing iss".to_string()))?;
    verify_signature(issuer, raw.signing_input.as_bytes(), &raw.signature)?;

    let claims = match claim_type_of(&raw.payload)? {
        ClaimType::Operator => {
            DecodedClaims::Operator(serde_json::from_value::<Claims<OperatorClaims>>(raw.payload)?)
        }
        ClaimType::Account => {
            DecodedClaims::Account(serde_json::from_value::<Claims<AccountClaims>>(raw.payload)?)
        }
        ClaimType::User => {
            DecodedClaims::User(serde_json::from_value::<Claims<UserClaims>>(raw.payload)?)
        }
        ClaimType::Generic => {
            DecodedClaims::Generic(serde_json::from_value::<Claims<GenericClaims>>(raw.payload)?)
        }
    };

    tracing::debug!(
        claim_type = %claims.claim_type(),
        subject = %claims.subject(),
        "Decoded token"
    );

    Ok(claims)
}

/// Decode a token that must carry claims of `expected` type.
pub fn decode_as(token: &str, expected: ClaimType) -> Result<DecodedClaims, JwtError> {
    let claims = decode_token(token)?;
    let found = claims.claim_type();
    if found != expected {
        return Err(JwtError::WrongClaimType { expected, found });
    }
    Ok(claims)
}

/// Inspect a token without verifying its signature (for debugging).
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, JwtError> {
    let raw = split_token(token)?;
    let claim_type = claim_type_of(&raw.payload)?;

    Ok(TokenInfo {
        claim_type,
        algorithm: raw.header.alg,
        claims: raw.payload,
    })
}

/// Information about a token (for inspection).
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    /// Claim type from the `nats` payload.
    pub claim_type: ClaimType,
    /// Header algorithm.
    pub algorithm: String,
    /// Raw claims.
    pub claims: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::Role;

    fn operator_token(operator: &KeyPair) -> String {
        TokenBuilder::new(operator.clone())
            .sign(
                "op1",
                &operator.public_key(),
                ClaimType::Operator,
                OperatorClaims::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_sign_and_decode_operator_token() {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let token = operator_token(&operator);

        let claims = decode_token(&token).unwrap();
        assert_eq!(claims.claim_type(), ClaimType::Operator);
        assert_eq!(claims.subject(), operator.public_key());
        assert_eq!(claims.issuer(), operator.public_key());
        assert_eq!(claims.name(), "op1");
    }

    #[test]
    fn test_account_token_binding() {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let account = KeyPair::generate(Role::Account).unwrap();

        let token = TokenBuilder::new(operator.clone())
            .sign(
                "acc1",
                &account.public_key(),
                ClaimType::Account,
                AccountClaims::default(),
            )
            .unwrap();

        let DecodedClaims::Account(claims) = decode_as(&token, ClaimType::Account).unwrap() else {
            panic!("expected account claims");
        };
        assert_eq!(claims.sub, account.public_key());
        assert_eq!(claims.iss, operator.public_key());
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_decode_as_wrong_type() {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let token = operator_token(&operator);

        let err = decode_as(&token, ClaimType::User).unwrap_err();
        assert!(matches!(
            err,
            JwtError::WrongClaimType {
                expected: ClaimType::User,
                found: ClaimType::Operator
            }
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let token = operator_token(&operator);

        let other = KeyPair::generate(Role::Operator).unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&serde_json::json!({
                "jti": "x",
                "iat": 0,
                "iss": operator.public_key(),
                "sub": other.public_key(),
                "nats": { "type": "operator", "version": 2 }
            }))
            .unwrap(),
        );
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(
            decode_token(&forged),
            Err(JwtError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        assert!(decode_token("").is_err());
        assert!(decode_token("a.b").is_err());
        assert!(decode_token("a.b.c.d").is_err());
        assert!(decode_token("!!!.???.***").is_err());
    }

    #[test]
    fn test_jti_is_stable_hash() {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let builder = TokenBuilder::new(operator.clone());
        let mut claims = Claims {
            jti: String::new(),
            iat: 1_700_000_000,
            iss: String::new(),
            name: "op1".to_string(),
            sub: operator.public_key(),
            exp: None,
            nbf: None,
            aud: None,
            nats: NatsPayload::new(ClaimType::Operator, OperatorClaims::default()),
        };

        builder.encode(&mut claims).unwrap();
        let first = claims.jti.clone();
        builder.encode(&mut claims).unwrap();
        assert_eq!(claims.jti, first);
    }

    #[test]
    fn test_inspect_unverified() {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let info = inspect_token_unverified(&operator_token(&operator)).unwrap();

        assert_eq!(info.claim_type, ClaimType::Operator);
        assert_eq!(info.algorithm, TOKEN_ALGORITHM);
        assert_eq!(info.claims["name"], "op1");
    }
}
