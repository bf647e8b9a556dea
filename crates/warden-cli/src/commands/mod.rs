//! CLI command implementations.
//!
//! Every command returns the text to print; structured results are rendered
//! as pretty JSON.

pub mod creds;
pub mod issue;
pub mod jwt;
pub mod nkey;
pub mod sync;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Render a result as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Failed to render output")
}

/// Load issue parameters from a YAML or JSON file, or defaults without one.
pub fn load_params<T: DeserializeOwned + Default>(file: Option<&Path>) -> anyhow::Result<T> {
    let Some(file) = file else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    // YAML is a superset of JSON, so one parser covers both.
    serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid parameters in {}", file.display()))
}

/// Read a value given inline, or from a file when prefixed with `@`.
pub fn inline_or_file(value: &str) -> anyhow::Result<String> {
    match value.strip_prefix('@') {
        Some(path) => Ok(fs::read_to_string(path)
            .with_context(|| format!("Failed to read {path}"))?
            .trim()
            .to_string()),
        None => Ok(value.trim().to_string()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use warden_core::SyncConfig;
    use warden_engine::Engine;
    use warden_store::FileStorage;
    use warden_sync::testutil::MockConnector;

    /// Engine over a file store in `dir`, with no reachable cluster.
    pub fn engine(dir: &std::path::Path) -> Engine {
        Engine::new(
            Arc::new(FileStorage::new(dir).unwrap()),
            Arc::new(MockConnector::new(Vec::new())),
            SyncConfig {
                response_window_ms: 50,
                ..Default::default()
            },
        )
    }
}
