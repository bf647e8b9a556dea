use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use warden_core::{StorageBackend, WardenConfig};
use warden_engine::Engine;

mod commands;

use commands::{creds, issue, jwt, nkey, sync};

#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version,
    about = "Issue and manage NATS operators, accounts and users"
)]
struct Cli {
    /// Path to warden.yaml
    #[arg(long, global = true, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Store directory, overriding the configured storage
    #[arg(long, global = true, env = "WARDEN_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Operator issue records
    Operator {
        #[command(subcommand)]
        cmd: issue::OperatorCommand,
    },

    /// Account issue records
    Account {
        #[command(subcommand)]
        cmd: issue::AccountCommand,
    },

    /// User issue records
    User {
        #[command(subcommand)]
        cmd: issue::UserCommand,
    },

    /// Key pairs stored by identity path
    Nkey {
        #[command(subcommand)]
        cmd: nkey::NkeyCommand,
    },

    /// Tokens stored by identity path
    Jwt {
        #[command(subcommand)]
        cmd: jwt::JwtCommand,
    },

    /// Print the .creds document of a user
    Creds {
        operator: String,
        account: String,
        user: String,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Push or revoke accounts on the operator's cluster
    Sync {
        #[command(subcommand)]
        cmd: sync::SyncCommand,
    },
}

fn load_config(path: Option<&Path>, store: Option<PathBuf>) -> anyhow::Result<WardenConfig> {
    let mut config = match path {
        Some(path) => WardenConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => WardenConfig::default(),
    };

    if let Some(store) = store {
        config.storage.backend = StorageBackend::File;
        config.storage.directory = store;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.store)?;

    // stdout carries command output, logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let engine = Engine::from_config(&config).context("Failed to open store")?;

    let output = match cli.cmd {
        Command::Operator { cmd } => issue::run_operator(&engine, cmd).await?,
        Command::Account { cmd } => issue::run_account(&engine, cmd).await?,
        Command::User { cmd } => issue::run_user(&engine, cmd).await?,
        Command::Nkey { cmd } => nkey::run(&engine, cmd).await?,
        Command::Jwt { cmd } => jwt::run(&engine, cmd).await?,
        Command::Creds {
            operator,
            account,
            user,
            output,
        } => creds::run(&engine, &operator, &account, &user, output.as_deref()).await?,
        Command::Sync { cmd } => sync::run(&engine, cmd).await?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "warden",
            "--store",
            "/tmp/store",
            "account",
            "issue",
            "op1",
            "orders",
            "--file",
            "orders.yaml",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/store")));
        assert!(matches!(
            cli.cmd,
            Command::Account {
                cmd: issue::AccountCommand::Issue { .. }
            }
        ));
    }

    #[test]
    fn test_store_overrides_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("warden.yaml");
        std::fs::write(&config_path, "storage:\n  backend: memory\n").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);

        let config = load_config(Some(&config_path), Some(dir.path().join("store"))).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.directory, dir.path().join("store"));
    }

    #[test]
    fn test_missing_config_reported() {
        let err = load_config(Some(Path::new("/nonexistent/warden.yaml")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
