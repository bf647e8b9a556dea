//! `warden creds <operator> <account> <user>` - Render a user's .creds file.

use anyhow::Context;
use std::fs;
use std::path::Path;
use warden_engine::Engine;

pub async fn run(
    engine: &Engine,
    operator: &str,
    account: &str,
    user: &str,
    output: Option<&Path>,
) -> anyhow::Result<String> {
    let creds = engine
        .read_user_creds(operator, account, user)
        .await
        .with_context(|| format!("No credentials for {operator}/{account}/{user}"))?;

    match output {
        Some(path) => {
            fs::write(path, &creds)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote credentials");
            Ok(String::new())
        }
        None => Ok(creds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use tempfile::tempdir;
    use warden_engine::{AccountIssueParams, OperatorIssueParams, UserIssueParams};

    #[tokio::test]
    async fn test_creds_to_file() {
        let dir = tempdir().unwrap();
        let engine = testing::engine(dir.path());
        engine
            .issue_operator("op1", OperatorIssueParams::default())
            .await
            .unwrap();
        engine
            .issue_account("op1", "orders", AccountIssueParams::default())
            .await
            .unwrap();
        engine
            .issue_user("op1", "orders", "alice", UserIssueParams::default())
            .await
            .unwrap();

        let printed = run(&engine, "op1", "orders", "alice", None).await.unwrap();
        assert!(printed.starts_with("-----BEGIN NATS USER JWT-----"));

        let file = dir.path().join("alice.creds");
        let out = run(&engine, "op1", "orders", "alice", Some(&file))
            .await
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(fs::read_to_string(&file).unwrap(), printed);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let dir = tempdir().unwrap();
        let engine = testing::engine(dir.path());
        assert!(run(&engine, "op1", "orders", "bob", None).await.is_err());
    }
}
