//! Key pair commands.
//!
//! `warden nkey read <path>` - Show the public key (and seed with `--seed`).
//! `warden nkey list <listing>` - List key pairs below a collection path.
//! `warden nkey import <path> <seed|@file>` - Store an existing seed.
//! `warden nkey delete <path>` - Remove a key pair.

use super::{inline_or_file, to_json};
use anyhow::Context;
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;
use warden_core::{IdentityPath, Listing, Role};
use warden_engine::Engine;
use warden_jwt::KeyPair;

#[derive(Subcommand, Debug)]
pub enum NkeyCommand {
    /// Show a key pair, e.g. `operator/op1/account/acc1`
    Read {
        path: IdentityPath,
        /// Include the seed and raw private key
        #[arg(long)]
        seed: bool,
    },
    /// List key pairs, e.g. `operator/op1/account`
    List { listing: Listing },
    /// Import a seed, inline or as `@file`
    Import { path: IdentityPath, seed: String },
    /// Delete a key pair
    Delete { path: IdentityPath },
}

#[derive(Debug, Serialize)]
struct NkeyOutput {
    path: String,
    role: Role,
    public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
}

impl NkeyOutput {
    fn new(path: &IdentityPath, key_pair: &KeyPair, secrets: bool) -> anyhow::Result<Self> {
        let (seed, private_key) = if secrets {
            (
                Some(key_pair.seed().to_string()),
                Some(key_pair.private_key()?),
            )
        } else {
            (None, None)
        };
        Ok(Self {
            path: path.to_string(),
            role: key_pair.role(),
            public_key: key_pair.public_key(),
            seed,
            private_key,
        })
    }
}

pub async fn run(engine: &Engine, cmd: NkeyCommand) -> anyhow::Result<String> {
    match cmd {
        NkeyCommand::Read { path, seed } => {
            let key_pair = engine
                .read_nkey(&path)
                .await?
                .with_context(|| format!("No key pair at {path}"))?;
            to_json(&NkeyOutput::new(&path, &key_pair, seed)?)
        }
        NkeyCommand::List { listing } => to_json(&engine.list_nkeys(&listing).await?),
        NkeyCommand::Import { path, seed } => {
            let seed = inline_or_file(&seed)?;
            let key_pair = engine
                .import_nkey(&path, &seed)
                .await
                .with_context(|| format!("Failed to import key pair at {path}"))?;
            to_json(&NkeyOutput::new(&path, &key_pair, false)?)
        }
        NkeyCommand::Delete { path } => {
            engine.delete_nkey(&path).await?;
            to_json(&json!({ "deleted": format!("nkey/{path}") }))
        }
    }
}
