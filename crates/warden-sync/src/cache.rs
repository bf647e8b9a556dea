//! Shared control-plane connection, created lazily and reused.

use crate::connection::{Connection, Connector, UserCredentials};
use crate::control::ControlPlane;
use crate::error::SyncError;
use std::sync::Arc;
use tokio::sync::RwLock;
use warden_core::SyncConfig;

/// What a cached connection was created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionKey {
    pub operator: String,
    pub url: String,
}

struct CachedConnection {
    key: ConnectionKey,
    connection: Arc<dyn Connection>,
}

/// Holds at most one connection, replaced when the operator or the account
/// server URL changes.
pub struct ClientCache {
    connector: Arc<dyn Connector>,
    config: SyncConfig,
    current: RwLock<Option<CachedConnection>>,
}

impl ClientCache {
    pub fn new(connector: Arc<dyn Connector>, config: SyncConfig) -> Self {
        Self {
            connector,
            config,
            current: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Return the cached connection for `key`, connecting first if there is
    /// none or it was created for another key.
    pub async fn ensure_connected(
        &self,
        key: &ConnectionKey,
        credentials: &UserCredentials,
    ) -> Result<Arc<dyn Connection>, SyncError> {
        {
            let current = self.current.read().await;
            if let Some(cached) = current.as_ref().filter(|c| &c.key == key) {
                return Ok(cached.connection.clone());
            }
        }

        let mut current = self.current.write().await;
        // Another task may have connected while we waited for the lock.
        if let Some(cached) = current.as_ref().filter(|c| &c.key == key) {
            return Ok(cached.connection.clone());
        }

        tracing::debug!(operator = %key.operator, url = %key.url, "Opening control-plane connection");
        let connection = self
            .connector
            .connect(&key.url, credentials, &self.config)
            .await?;
        *current = Some(CachedConnection {
            key: key.clone(),
            connection: connection.clone(),
        });
        Ok(connection)
    }

    /// Control plane bound to the connection for `key`.
    pub async fn control_plane(
        &self,
        key: &ConnectionKey,
        credentials: &UserCredentials,
    ) -> Result<ControlPlane, SyncError> {
        let connection = self.ensure_connected(key, credentials).await?;
        Ok(ControlPlane::new(connection, self.config.response_window()))
    }

    /// Drop the cached connection if it belongs to `operator`.
    pub async fn invalidate_operator(&self, operator: &str) {
        let mut current = self.current.write().await;
        if current.as_ref().is_some_and(|c| c.key.operator == operator) {
            tracing::debug!(operator = %operator, "Dropping control-plane connection");
            *current = None;
        }
    }

    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }
}
