//! Token builders, one per claim variant.
//!
//! Each builder combines a record's pass-through claims with the public keys
//! derived from stored key material and signs the result. The subject is
//! always the identity's own public key; the issuer is whichever key signs.

use crate::issue::{AccountIssue, OperatorIssue, UserIssue};
use warden_jwt::{
    AccountClaims, ClaimType, JwtError, KeyPair, OperatorClaims, TokenBuilder, UserClaims,
};

/// Self-signed operator token.
pub fn operator_token(
    issue: &OperatorIssue,
    operator: &KeyPair,
    signing_keys: Vec<String>,
    system_account: Option<String>,
) -> Result<String, JwtError> {
    let input = issue.claims.clone();
    let body = OperatorClaims {
        signing_keys,
        account_server_url: issue.sync.account_server_url.clone(),
        operator_service_urls: input.operator_service_urls,
        system_account,
        assert_server_version: input.assert_server_version,
        strict_signing_key_usage: input.strict_signing_key_usage,
        tags: input.tags,
        extra: input.extra,
    };

    TokenBuilder::new(operator.clone()).sign(
        &issue.operator,
        &operator.public_key(),
        ClaimType::Operator,
        body,
    )
}

/// Account token signed by the operator or one of its signing keys.
pub fn account_token(
    issue: &AccountIssue,
    subject: &str,
    signing_keys: Vec<String>,
    signer: &KeyPair,
) -> Result<String, JwtError> {
    let input = issue.claims.clone();
    let body = AccountClaims {
        signing_keys,
        description: input.description,
        info_url: input.info_url,
        tags: input.tags,
        extra: input.extra,
    };

    TokenBuilder::new(signer.clone()).sign(&issue.account, subject, ClaimType::Account, body)
}

/// User token signed by the account or one of its signing keys.
///
/// `issuer_account` must be the account's public key when `signer` is a
/// signing key, so servers can attribute the user to its account.
pub fn user_token(
    issue: &UserIssue,
    subject: &str,
    signer: &KeyPair,
    issuer_account: Option<String>,
) -> Result<String, JwtError> {
    let input = issue.claims.clone();
    let body = UserClaims {
        issuer_account,
        tags: input.tags,
        extra: input.extra,
    };

    TokenBuilder::new(signer.clone()).sign(&issue.user, subject, ClaimType::User, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AccountIssueParams, OperatorIssueParams, SyncSettings, UserIssueParams};
    use serde_json::json;
    use warden_core::Role;
    use warden_jwt::{DecodedClaims, decode_token};

    #[test]
    fn test_operator_token_self_signed() {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let signing = KeyPair::generate(Role::OperatorSigning).unwrap();
        let system = KeyPair::generate(Role::Account).unwrap();
        let issue = OperatorIssue::new(
            "op1",
            OperatorIssueParams {
                sync: SyncSettings {
                    enabled: true,
                    account_server_url: Some("nats://localhost:4222".to_string()),
                },
                ..Default::default()
            },
        );

        let token = operator_token(
            &issue,
            &operator,
            vec![signing.public_key()],
            Some(system.public_key()),
        )
        .unwrap();

        let DecodedClaims::Operator(claims) = decode_token(&token).unwrap() else {
            panic!("expected operator claims");
        };
        assert_eq!(claims.iss, operator.public_key());
        assert_eq!(claims.sub, operator.public_key());
        assert_eq!(claims.name, "op1");
        assert_eq!(claims.nats.body.signing_keys, vec![signing.public_key()]);
        assert_eq!(claims.nats.body.system_account, Some(system.public_key()));
        assert_eq!(
            claims.nats.body.account_server_url.as_deref(),
            Some("nats://localhost:4222")
        );
    }

    #[test]
    fn test_account_token_binding() {
        let operator = KeyPair::generate(Role::OperatorSigning).unwrap();
        let account = KeyPair::generate(Role::Account).unwrap();
        let params: AccountIssueParams = serde_json::from_value(json!({
            "claims": {"limits": {"conn": 5}}
        }))
        .unwrap();
        let issue = AccountIssue::new("op1", "acc1", params);

        let token = account_token(&issue, &account.public_key(), Vec::new(), &operator).unwrap();

        let DecodedClaims::Account(claims) = decode_token(&token).unwrap() else {
            panic!("expected account claims");
        };
        assert_eq!(claims.sub, account.public_key());
        assert_eq!(claims.iss, operator.public_key());
        assert_eq!(claims.nats.body.extra["limits"], json!({"conn": 5}));
    }

    #[test]
    fn test_user_token_issuer_account() {
        let account = KeyPair::generate(Role::Account).unwrap();
        let signing = KeyPair::generate(Role::AccountSigning).unwrap();
        let user = KeyPair::generate(Role::User).unwrap();
        let issue = UserIssue::new("op1", "acc1", "alice", UserIssueParams::default());

        let token = user_token(
            &issue,
            &user.public_key(),
            &signing,
            Some(account.public_key()),
        )
        .unwrap();

        let DecodedClaims::User(claims) = decode_token(&token).unwrap() else {
            panic!("expected user claims");
        };
        assert_eq!(claims.iss, signing.public_key());
        assert_eq!(claims.nats.body.issuer_account, Some(account.public_key()));
    }
}
