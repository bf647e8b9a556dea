//! Connections backed by `async-nats`.

use crate::connection::{Connection, Connector, ReplySubscription, UserCredentials};
use crate::error::SyncError;
use async_nats::{AuthError, Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use warden_core::SyncConfig;

/// Connects to a NATS cluster with user JWT authentication.
///
/// The client reconnects on its own with a fixed delay, so a transient
/// disconnect does not fail a request that is waiting for replies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NatsConnector;

impl NatsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for NatsConnector {
    async fn connect(
        &self,
        url: &str,
        credentials: &UserCredentials,
        config: &SyncConfig,
    ) -> Result<Arc<dyn Connection>, SyncError> {
        let signer = credentials.key_pair.clone();
        let delay = config.reconnect_delay();

        let options = ConnectOptions::with_jwt(credentials.jwt.clone(), move |nonce| {
            let signer = signer.clone();
            async move { signer.sign(&nonce).map_err(AuthError::new) }
        })
        .name(&config.client_name)
        .connection_timeout(config.connect_timeout())
        .max_reconnects(config.max_reconnects())
        .reconnect_delay_callback(move |_attempts| delay)
        .event_callback(|event| async move {
            tracing::warn!(event = %event, "NATS connection event");
        });

        let client = options
            .connect(url)
            .await
            .map_err(|e| SyncError::ConnectFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(url = %url, name = %config.client_name, "Connected to NATS cluster");
        Ok(Arc::new(NatsConnection { client }))
    }
}

/// A connected `async-nats` client.
pub struct NatsConnection {
    client: Client,
}

#[async_trait]
impl Connection for NatsConnection {
    fn new_inbox(&self) -> String {
        self.client.new_inbox()
    }

    async fn subscribe(&self, subject: &str) -> Result<Box<dyn ReplySubscription>, SyncError> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| SyncError::SubscribeFailed {
                subject: subject.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(NatsSubscription { subscriber }))
    }

    async fn publish_request(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), SyncError> {
        let publish_failed = |reason: String| SyncError::PublishFailed {
            subject: subject.to_string(),
            reason,
        };

        self.client
            .publish_with_reply(subject.to_string(), reply.to_string(), payload)
            .await
            .map_err(|e| publish_failed(e.to_string()))?;
        self.client
            .flush()
            .await
            .map_err(|e| publish_failed(e.to_string()))?;
        Ok(())
    }
}

struct NatsSubscription {
    subscriber: Subscriber,
}

#[async_trait]
impl ReplySubscription for NatsSubscription {
    async fn next_message(&mut self, timeout: Duration) -> Result<Option<Bytes>, SyncError> {
        match tokio::time::timeout(timeout, self.subscriber.next()).await {
            Ok(Some(message)) => Ok(Some(message.payload)),
            Ok(None) => Err(SyncError::ConnectionClosed),
            Err(_) => Ok(None),
        }
    }
}
