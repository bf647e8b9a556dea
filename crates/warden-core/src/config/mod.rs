//! Configuration types for Warden.
//!
//! Configuration is loaded from a single YAML file (`warden.yaml`). Every
//! section is optional and falls back to its defaults.
//!
//! ```yaml
//! storage:
//!   backend: file
//!   directory: /var/lib/warden
//! sync:
//!   response_window_ms: 1000
//! logging:
//!   filter: warden=debug,info
//! ```

pub mod storage;
pub mod sync;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use storage::{StorageBackend, StorageConfig};
pub use sync::SyncConfig;

/// Complete Warden configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Where key pairs, tokens and issue records are persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Control-plane sync tuning.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WardenConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.response_window_ms == 0 {
            return Err(ConfigError::Config(
                "sync.response_window_ms must be greater than zero".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::File && self.storage.directory.as_os_str().is_empty() {
            return Err(ConfigError::Config(
                "storage.directory is required for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = WardenConfig::from_yaml("{}").unwrap();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.sync.response_window(), Duration::from_secs(1));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "storage:\n  backend: memory\nsync:\n  response_window_ms: 250\nlogging:\n  filter: debug"
        )
        .unwrap();

        let config = WardenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.sync.response_window(), Duration::from_millis(250));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(WardenConfig::from_yaml("bogus: true").is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = WardenConfig::from_yaml("sync:\n  response_window_ms: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }
}
