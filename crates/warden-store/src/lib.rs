//! # warden-store
//!
//! Path-addressed key/value storage for Warden.
//!
//! Records are addressed by `/`-separated paths such as
//! `nkey/operator/op1/account/acc1`. Listing a prefix returns its immediate
//! children only: leaf records by name and sub-trees with a trailing `/`.
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`MemoryStorage`] | Process-local map, for tests and dry runs |
//! | [`FileStorage`] | One JSON file per record under a root directory |
//!
//! Storage offers read-after-write consistency per key and no transactions
//! across keys.

pub mod error;
pub mod file;
pub mod memory;
pub mod storage;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use storage::{Storage, create_storage, get_json, put_json};
