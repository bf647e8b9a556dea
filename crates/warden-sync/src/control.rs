//! Account push and revocation against the cluster.

use crate::connection::Connection;
use crate::error::SyncError;
use crate::fanin::collect_responses;
use crate::message::{DELETE_SUBJECT, ServerResponse, UPDATE_SUBJECT};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use warden_jwt::{ClaimType, GenericClaims, KeyPair, TokenBuilder};

/// Overall outcome of a control-plane request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// At least one node accepted the request.
    Acknowledged,
    /// Every node that replied reported an error.
    Rejected,
    /// No node replied within the window.
    NoResponse,
}

/// A node's error reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub server: String,
    pub code: i64,
    pub description: String,
}

/// Replies gathered for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub acknowledged: Vec<String>,
    pub rejected: Vec<Rejection>,
}

impl SyncReport {
    fn record(&mut self, response: ServerResponse) {
        match response.error {
            Some(error) => self.rejected.push(Rejection {
                server: response.server.name,
                code: error.code,
                description: error.description,
            }),
            None => self.acknowledged.push(response.server.name),
        }
    }

    /// Number of nodes that replied.
    pub fn responded(&self) -> usize {
        self.acknowledged.len() + self.rejected.len()
    }

    pub fn status(&self) -> SyncStatus {
        if !self.acknowledged.is_empty() {
            SyncStatus::Acknowledged
        } else if !self.rejected.is_empty() {
            SyncStatus::Rejected
        } else {
            SyncStatus::NoResponse
        }
    }
}

/// Pushes account tokens to, and revokes accounts from, the live cluster.
#[derive(Clone)]
pub struct ControlPlane {
    connection: Arc<dyn Connection>,
    window: Duration,
}

impl ControlPlane {
    pub fn new(connection: Arc<dyn Connection>, window: Duration) -> Self {
        Self { connection, window }
    }

    /// Publish an account token on the update subject.
    pub async fn push(&self, account_jwt: &str) -> Result<SyncReport, SyncError> {
        let report = self
            .request(UPDATE_SUBJECT, Bytes::copy_from_slice(account_jwt.as_bytes()))
            .await?;
        tracing::info!(
            acknowledged = report.acknowledged.len(),
            rejected = report.rejected.len(),
            "Pushed account token"
        );
        Ok(report)
    }

    /// Publish a deletion request for `accounts`, signed by the operator key.
    pub async fn revoke(
        &self,
        accounts: &[String],
        operator: &KeyPair,
    ) -> Result<SyncReport, SyncError> {
        let token = deletion_token(accounts, operator)?;
        let report = self
            .request(DELETE_SUBJECT, Bytes::from(token.into_bytes()))
            .await?;
        tracing::info!(
            accounts = accounts.len(),
            acknowledged = report.acknowledged.len(),
            rejected = report.rejected.len(),
            "Revoked accounts"
        );
        Ok(report)
    }

    async fn request(&self, subject: &str, payload: Bytes) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        collect_responses(
            self.connection.as_ref(),
            subject,
            payload,
            self.window,
            |response| report.record(response),
        )
        .await?;
        Ok(report)
    }
}

/// Generic claims listing the accounts to delete, issued and subjected by the
/// operator.
fn deletion_token(accounts: &[String], operator: &KeyPair) -> Result<String, SyncError> {
    let mut body = GenericClaims::new();
    body.insert(
        "accounts".to_string(),
        Value::Array(accounts.iter().cloned().map(Value::String).collect()),
    );
    let token = TokenBuilder::new(operator.clone()).sign(
        "",
        &operator.public_key(),
        ClaimType::Generic,
        &body,
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockConnection, MockNode};
    use warden_core::Role;
    use warden_jwt::{DecodedClaims, decode_token};

    const WINDOW: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_push_acknowledged() {
        let connection = Arc::new(MockConnection::new(vec![
            MockNode::accepting("n1"),
            MockNode::rejecting("n2", 400, "not trusted"),
        ]));
        let plane = ControlPlane::new(connection.clone(), WINDOW);

        let report = plane.push("account.jwt").await.unwrap();
        assert_eq!(report.status(), SyncStatus::Acknowledged);
        assert_eq!(report.responded(), 2);
        assert_eq!(report.acknowledged, vec!["n1"]);
        assert_eq!(report.rejected[0].code, 400);

        let published = connection.published();
        assert_eq!(published[0].subject, UPDATE_SUBJECT);
        assert_eq!(published[0].payload.as_ref(), b"account.jwt");
    }

    #[tokio::test]
    async fn test_push_without_nodes() {
        let plane = ControlPlane::new(Arc::new(MockConnection::new(Vec::new())), WINDOW);
        let report = plane.push("account.jwt").await.unwrap();
        assert_eq!(report.status(), SyncStatus::NoResponse);
    }

    #[tokio::test]
    async fn test_push_all_rejected() {
        let plane = ControlPlane::new(
            Arc::new(MockConnection::new(vec![MockNode::rejecting("n1", 500, "x")])),
            WINDOW,
        );
        let report = plane.push("account.jwt").await.unwrap();
        assert_eq!(report.status(), SyncStatus::Rejected);
    }

    #[tokio::test]
    async fn test_revoke_signs_deletion_request() {
        let operator = KeyPair::generate(Role::Operator).unwrap();
        let connection = Arc::new(MockConnection::new(vec![MockNode::accepting("n1")]));
        let plane = ControlPlane::new(connection.clone(), WINDOW);

        let accounts = vec!["AAAA".to_string(), "ABBB".to_string()];
        let report = plane.revoke(&accounts, &operator).await.unwrap();
        assert_eq!(report.status(), SyncStatus::Acknowledged);

        let published = connection.published();
        assert_eq!(published[0].subject, DELETE_SUBJECT);
        let token = std::str::from_utf8(&published[0].payload).unwrap();
        let DecodedClaims::Generic(claims) = decode_token(token).unwrap() else {
            panic!("expected generic claims");
        };
        assert_eq!(claims.iss, operator.public_key());
        assert_eq!(claims.sub, operator.public_key());
        assert_eq!(
            claims.nats.body["accounts"],
            serde_json::json!(["AAAA", "ABBB"])
        );
    }
}
