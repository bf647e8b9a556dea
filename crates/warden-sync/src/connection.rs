//! Connection seam between the control plane and the messaging client.

use crate::error::SyncError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use warden_core::SyncConfig;
use warden_jwt::KeyPair;

/// Credentials the client authenticates with: a user token and the user key
/// that signs the server nonce.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub jwt: String,
    pub key_pair: KeyPair,
}

/// A live connection to the cluster.
#[async_trait]
pub trait Connection: Send + Sync {
    /// A fresh, unique reply subject.
    fn new_inbox(&self) -> String;

    /// Subscribe synchronously to `subject`. The subscription must be active
    /// before the matching request is published.
    async fn subscribe(&self, subject: &str) -> Result<Box<dyn ReplySubscription>, SyncError>;

    /// Publish `payload` on `subject` with `reply` as the reply subject and
    /// flush it to the server.
    async fn publish_request(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), SyncError>;
}

/// Pull-based subscription on a reply inbox.
#[async_trait]
pub trait ReplySubscription: Send {
    /// Wait up to `timeout` for the next message. `Ok(None)` means the
    /// timeout elapsed.
    async fn next_message(&mut self, timeout: Duration) -> Result<Option<Bytes>, SyncError>;
}

/// Factory for connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        url: &str,
        credentials: &UserCredentials,
        config: &SyncConfig,
    ) -> Result<Arc<dyn Connection>, SyncError>;
}
