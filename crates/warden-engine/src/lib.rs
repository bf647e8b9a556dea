//! # warden-engine
//!
//! Issuance engine for the NATS Operator → Account → User trust chain.
//!
//! For every identity the engine keeps three records under the same
//! identity path:
//!
//! | Category | Content |
//! |----------|---------|
//! | `issue/` | Desired state submitted by the caller |
//! | `nkey/` | Seed of the identity's key pair (signing keys included) |
//! | `jwt/` | Token signed by the parent or one of its signing keys |
//!
//! The issue record is the source of truth: re-issuing with new parameters
//! re-signs the token with the existing key pair and reconciles signing keys
//! against the previous record.
//!
//! ## Example
//!
//! ```ignore
//! let engine = Engine::from_config(&config)?;
//! engine.issue_operator("op1", OperatorIssueParams::default()).await?;
//! engine.issue_account("op1", "orders", AccountIssueParams::default()).await?;
//! engine.issue_user("op1", "orders", "alice", UserIssueParams::default()).await?;
//! let creds = engine.read_user_creds("op1", "orders", "alice").await?;
//! ```

pub mod claims;
pub mod engine;
pub mod error;
pub mod issue;
pub mod jwt;
mod listing;
pub mod nkey;
pub mod params;

pub use engine::Engine;
pub use error::{EngineError, Result};
pub use issue::{
    AccountIssue, AccountIssueView, AccountStatus, IdentityStatus, IssueView, OperatorIssue,
    OperatorIssueView, OperatorStatus, PUSH_USER, SyncOutcome, UserIssue, UserIssueView,
};
pub use jwt::{JwtRecord, JwtStore};
pub use nkey::{NkeyRecord, NkeyStore};
pub use params::{
    AccountClaimsInput, AccountIssueParams, DEFAULT_SYSTEM_ACCOUNT, OperatorClaimsInput,
    OperatorIssueParams, SyncSettings, UserClaimsInput, UserIssueParams,
};
