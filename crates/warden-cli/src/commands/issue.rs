//! Issue record commands.
//!
//! `warden operator issue|read|list|delete`
//! `warden account issue|read|list|delete`
//! `warden user issue|read|list|delete`

use super::{load_params, to_json};
use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;
use warden_engine::{AccountIssueParams, Engine, OperatorIssueParams, UserIssueParams};

#[derive(Subcommand, Debug)]
pub enum OperatorCommand {
    /// Create or update an operator
    Issue {
        operator: String,
        /// Parameters file (YAML or JSON)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show an operator issue and its status
    Read { operator: String },
    /// List operator issues
    List,
    /// Delete an operator with its signing keys and system account
    Delete { operator: String },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Create or update an account
    Issue {
        operator: String,
        account: String,
        /// Parameters file (YAML or JSON)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show an account issue and its status
    Read { operator: String, account: String },
    /// List account issues of an operator
    List { operator: String },
    /// Delete an account with its signing keys
    Delete { operator: String, account: String },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create or update a user
    Issue {
        operator: String,
        account: String,
        user: String,
        /// Parameters file (YAML or JSON)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show a user issue and its status
    Read {
        operator: String,
        account: String,
        user: String,
    },
    /// List user issues of an account
    List { operator: String, account: String },
    /// Delete a user
    Delete {
        operator: String,
        account: String,
        user: String,
    },
}

pub async fn run_operator(engine: &Engine, cmd: OperatorCommand) -> anyhow::Result<String> {
    match cmd {
        OperatorCommand::Issue { operator, file } => {
            let params: OperatorIssueParams = load_params(file.as_deref())?;
            let view = engine
                .issue_operator(&operator, params)
                .await
                .with_context(|| format!("Failed to issue operator {operator}"))?;
            to_json(&view)
        }
        OperatorCommand::Read { operator } => {
            let view = engine
                .read_operator_issue(&operator)
                .await?
                .with_context(|| format!("Operator {operator} is not issued"))?;
            to_json(&view)
        }
        OperatorCommand::List => to_json(&engine.list_operator_issues().await?),
        OperatorCommand::Delete { operator } => {
            engine.delete_operator_issue(&operator).await?;
            to_json(&json!({ "deleted": format!("operator/{operator}") }))
        }
    }
}

pub async fn run_account(engine: &Engine, cmd: AccountCommand) -> anyhow::Result<String> {
    match cmd {
        AccountCommand::Issue {
            operator,
            account,
            file,
        } => {
            let params: AccountIssueParams = load_params(file.as_deref())?;
            let view = engine
                .issue_account(&operator, &account, params)
                .await
                .with_context(|| format!("Failed to issue account {operator}/{account}"))?;
            to_json(&view)
        }
        AccountCommand::Read { operator, account } => {
            let view = engine
                .read_account_issue(&operator, &account)
                .await?
                .with_context(|| format!("Account {operator}/{account} is not issued"))?;
            to_json(&view)
        }
        AccountCommand::List { operator } => to_json(&engine.list_account_issues(&operator).await?),
        AccountCommand::Delete { operator, account } => {
            let revoke = engine.delete_account_issue(&operator, &account).await?;
            to_json(&json!({
                "deleted": format!("operator/{operator}/account/{account}"),
                "revoke": revoke,
            }))
        }
    }
}

pub async fn run_user(engine: &Engine, cmd: UserCommand) -> anyhow::Result<String> {
    match cmd {
        UserCommand::Issue {
            operator,
            account,
            user,
            file,
        } => {
            let params: UserIssueParams = load_params(file.as_deref())?;
            let view = engine
                .issue_user(&operator, &account, &user, params)
                .await
                .with_context(|| format!("Failed to issue user {operator}/{account}/{user}"))?;
            to_json(&view)
        }
        UserCommand::Read {
            operator,
            account,
            user,
        } => {
            let view = engine
                .read_user_issue(&operator, &account, &user)
                .await?
                .with_context(|| format!("User {operator}/{account}/{user} is not issued"))?;
            to_json(&view)
        }
        UserCommand::List { operator, account } => {
            to_json(&engine.list_user_issues(&operator, &account).await?)
        }
        UserCommand::Delete {
            operator,
            account,
            user,
        } => {
            engine.delete_user_issue(&operator, &account, &user).await?;
            to_json(&json!({
                "deleted": format!("operator/{operator}/account/{account}/user/{user}")
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_issue_read_delete_operator() {
        let dir = tempdir().unwrap();
        let engine = testing::engine(dir.path());

        let out = run_operator(
            &engine,
            OperatorCommand::Issue {
                operator: "op1".to_string(),
                file: None,
            },
        )
        .await
        .unwrap();
        let view: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(view["operator"], "op1");
        assert_eq!(view["system_account"], "SYS");
        assert_eq!(view["status"]["jwt"], true);
        assert!(dir.path().join("jwt/operator/op1.json").exists());

        let out = run_operator(&engine, OperatorCommand::List).await.unwrap();
        assert_eq!(serde_json::from_str::<Vec<String>>(&out).unwrap(), vec!["op1"]);

        run_operator(
            &engine,
            OperatorCommand::Delete {
                operator: "op1".to_string(),
            },
        )
        .await
        .unwrap();
        let missing = run_operator(
            &engine,
            OperatorCommand::Read {
                operator: "op1".to_string(),
            },
        )
        .await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_account_and_user_from_files() {
        let dir = tempdir().unwrap();
        let engine = testing::engine(dir.path());
        let account_file = dir.path().join("orders.yaml");
        std::fs::write(&account_file, "signing_keys: [ask1]\nclaims:\n  description: orders\n").unwrap();
        let user_file = dir.path().join("alice.json");
        std::fs::write(&user_file, r#"{"use_signing_key": "ask1"}"#).unwrap();

        run_operator(
            &engine,
            OperatorCommand::Issue {
                operator: "op1".to_string(),
                file: None,
            },
        )
        .await
        .unwrap();
        let out = run_account(
            &engine,
            AccountCommand::Issue {
                operator: "op1".to_string(),
                account: "orders".to_string(),
                file: Some(account_file),
            },
        )
        .await
        .unwrap();
        let view: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(view["claims"]["description"], "orders");

        run_user(
            &engine,
            UserCommand::Issue {
                operator: "op1".to_string(),
                account: "orders".to_string(),
                user: "alice".to_string(),
                file: Some(user_file),
            },
        )
        .await
        .unwrap();

        let out = run_user(
            &engine,
            UserCommand::List {
                operator: "op1".to_string(),
                account: "orders".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(serde_json::from_str::<Vec<String>>(&out).unwrap(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_issue_error_has_context() {
        let dir = tempdir().unwrap();
        let engine = testing::engine(dir.path());

        let err = run_account(
            &engine,
            AccountCommand::Issue {
                operator: "op1".to_string(),
                account: "orders".to_string(),
                file: None,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to issue account op1/orders"));
    }
}
