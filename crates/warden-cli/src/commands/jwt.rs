//! Token commands.
//!
//! `warden jwt read <path>` - Print a token (decoded with `--decode`).
//! `warden jwt list <listing>` - List tokens below a collection path.
//! `warden jwt import <path> <token|@file>` - Verify and store a token.
//! `warden jwt delete <path>` - Remove a token.

use super::{inline_or_file, to_json};
use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use warden_core::{IdentityPath, Listing};
use warden_engine::Engine;
use warden_jwt::inspect_token_unverified;

#[derive(Subcommand, Debug)]
pub enum JwtCommand {
    /// Print the token of an identity
    Read {
        path: IdentityPath,
        /// Print the decoded claims instead of the encoded token
        #[arg(long)]
        decode: bool,
    },
    /// List tokens, e.g. `operator/op1/account`
    List { listing: Listing },
    /// Import a token, inline or as `@file`
    Import { path: IdentityPath, token: String },
    /// Delete a token
    Delete { path: IdentityPath },
}

pub async fn run(engine: &Engine, cmd: JwtCommand) -> anyhow::Result<String> {
    match cmd {
        JwtCommand::Read { path, decode } => {
            let token = engine
                .read_jwt(&path)
                .await?
                .with_context(|| format!("No token at {path}"))?;
            if decode {
                let info = inspect_token_unverified(&token)
                    .with_context(|| format!("Stored token at {path} does not decode"))?;
                to_json(&info)
            } else {
                Ok(token)
            }
        }
        JwtCommand::List { listing } => to_json(&engine.list_jwts(&listing).await?),
        JwtCommand::Import { path, token } => {
            let token = inline_or_file(&token)?;
            let claims = engine
                .import_jwt(&path, &token)
                .await
                .with_context(|| format!("Failed to import token at {path}"))?;
            to_json(&json!({
                "path": path.to_string(),
                "type": claims.claim_type(),
                "subject": claims.subject(),
                "issuer": claims.issuer(),
            }))
        }
        JwtCommand::Delete { path } => {
            engine.delete_jwt(&path).await?;
            to_json(&json!({ "deleted": format!("jwt/{path}") }))
        }
    }
}
