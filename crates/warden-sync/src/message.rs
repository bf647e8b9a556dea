//! Control-plane subjects and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Subject on which account tokens are pushed to resolver nodes.
pub const UPDATE_SUBJECT: &str = "$SYS.REQ.CLAIMS.UPDATE";

/// Subject on which signed account deletion requests are published.
pub const DELETE_SUBJECT: &str = "$SYS.REQ.CLAIMS.DELETE";

/// Identity of the node that answered a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, rename = "ver", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Error reported by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: i64,
}

/// Reply published by a node on the request inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub server: ServerInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Reason a reply was not counted.
#[derive(Debug, Error, PartialEq)]
pub enum MalformedResponse {
    #[error("invalid response body: {0}")]
    Unparseable(String),

    #[error("response carries no server name")]
    MissingServerName,

    #[error("response carries neither error nor data")]
    MissingOutcome,

    #[error("response carries both error and data")]
    AmbiguousOutcome,
}

impl ServerResponse {
    /// Parse and check a reply: it must name its server and carry exactly
    /// one of `error` or `data`.
    pub fn parse(payload: &[u8]) -> Result<Self, MalformedResponse> {
        let response: ServerResponse = serde_json::from_slice(payload)
            .map_err(|e| MalformedResponse::Unparseable(e.to_string()))?;
        response.validate()?;
        Ok(response)
    }

    pub fn validate(&self) -> Result<(), MalformedResponse> {
        if self.server.name.is_empty() {
            return Err(MalformedResponse::MissingServerName);
        }
        match (&self.error, &self.data) {
            (Some(_), Some(_)) => Err(MalformedResponse::AmbiguousOutcome),
            (None, None) => Err(MalformedResponse::MissingOutcome),
            _ => Ok(()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
