//! Control-plane sync configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the connection to the NATS cluster and the response window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum time the fan-in loop waits for node responses.
    #[serde(default = "default_response_window_ms")]
    pub response_window_ms: u64,

    /// Timeout for establishing the initial connection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Delay between reconnect attempts.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Total time spent reconnecting before the client gives up.
    #[serde(default = "default_max_reconnect_wait_secs")]
    pub max_reconnect_wait_secs: u64,

    /// Connection name reported to the NATS servers.
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            response_window_ms: default_response_window_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_wait_secs: default_max_reconnect_wait_secs(),
            client_name: default_client_name(),
        }
    }
}

impl SyncConfig {
    pub fn response_window(&self) -> Duration {
        Duration::from_millis(self.response_window_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Number of reconnect attempts that fit into the reconnect budget.
    pub fn max_reconnects(&self) -> usize {
        let delay = self.reconnect_delay_ms.max(1);
        (self.max_reconnect_wait_secs.saturating_mul(1000) / delay).max(1) as usize
    }
}

fn default_response_window_ms() -> u64 {
    1000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

fn default_max_reconnect_wait_secs() -> u64 {
    600
}

fn default_client_name() -> String {
    "warden".to_string()
}
