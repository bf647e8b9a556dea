//! Control-plane commands.
//!
//! `warden sync push <operator> <account>` - Push the stored account token.
//! `warden sync revoke <operator> <account>...` - Revoke accounts by name or
//! public key.

use super::to_json;
use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use warden_engine::Engine;

#[derive(Subcommand, Debug)]
pub enum SyncCommand {
    /// Push an account token to the operator's cluster
    Push { operator: String, account: String },
    /// Revoke accounts on the operator's cluster
    Revoke {
        operator: String,
        #[arg(required = true)]
        accounts: Vec<String>,
    },
}

pub async fn run(engine: &Engine, cmd: SyncCommand) -> anyhow::Result<String> {
    let report = match cmd {
        SyncCommand::Push { operator, account } => engine
            .push_account(&operator, &account)
            .await
            .with_context(|| format!("Failed to push account {operator}/{account}"))?,
        SyncCommand::Revoke { operator, accounts } => engine
            .revoke_accounts(&operator, &accounts)
            .await
            .with_context(|| format!("Failed to revoke accounts of {operator}"))?,
    };

    to_json(&json!({
        "status": report.status(),
        "responded": report.responded(),
        "acknowledged": report.acknowledged,
        "rejected": report.rejected,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use tempfile::tempdir;
    use warden_engine::{AccountIssueParams, OperatorIssueParams, SyncSettings};

    #[tokio::test]
    async fn test_push_without_responders() {
        let dir = tempdir().unwrap();
        let engine = testing::engine(dir.path());
        engine
            .issue_operator(
                "op1",
                OperatorIssueParams {
                    sync: SyncSettings {
                        enabled: true,
                        account_server_url: Some("nats://127.0.0.1:4222".to_string()),
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        engine
            .issue_account("op1", "orders", AccountIssueParams::default())
            .await
            .unwrap();

        let out = run(
            &engine,
            SyncCommand::Push {
                operator: "op1".to_string(),
                account: "orders".to_string(),
            },
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "no_response");
        assert_eq!(value["responded"], 0);
    }

    #[tokio::test]
    async fn test_push_unknown_operator() {
        let dir = tempdir().unwrap();
        let engine = testing::engine(dir.path());
        let err = run(
            &engine,
            SyncCommand::Push {
                operator: "op1".to_string(),
                account: "orders".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to push account op1/orders"));
    }
}
