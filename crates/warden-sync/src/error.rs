//! Error types for the sync crate.

use thiserror::Error;
use warden_jwt::JwtError;

/// Errors that can occur while talking to the cluster.
///
/// Receiving no responses is not an error; see
/// [`SyncStatus`](crate::SyncStatus).
#[derive(Debug, Error)]
pub enum SyncError {
    /// Failed to connect to the cluster.
    #[error("failed to connect to {url}: {reason}")]
    ConnectFailed { url: String, reason: String },

    /// Failed to subscribe to the reply inbox.
    #[error("failed to subscribe to {subject}: {reason}")]
    SubscribeFailed { subject: String, reason: String },

    /// Failed to publish the request.
    #[error("failed to publish on {subject}: {reason}")]
    PublishFailed { subject: String, reason: String },

    /// The connection was closed while waiting for responses.
    #[error("connection closed")]
    ConnectionClosed,

    /// Failed to sign the request token.
    #[error("failed to sign request: {0}")]
    Signing(#[from] JwtError),
}
