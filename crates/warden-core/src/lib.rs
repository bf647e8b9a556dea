//! # warden-core
//!
//! Types shared across all Warden crates.
//!
//! - [`paths`]: the identity path grammar used as the storage key scheme
//! - [`config`]: workspace configuration loaded from YAML
//!
//! ## Identity hierarchy
//!
//! | Identity | Path | Signed by |
//! |----------|------|-----------|
//! | Operator | `operator/{op}` | itself |
//! | Operator signing key | `operator/{op}/signing/{id}` | - |
//! | Account | `operator/{op}/account/{acc}` | operator or operator signing key |
//! | Account signing key | `operator/{op}/account/{acc}/signing/{id}` | - |
//! | User | `operator/{op}/account/{acc}/user/{user}` | account or account signing key |

pub mod config;
pub mod paths;

pub use config::{ConfigError, LoggingConfig, StorageBackend, StorageConfig, SyncConfig, WardenConfig};
pub use paths::{Category, IdentityPath, Listing, PathError, Role, validate_segment};
