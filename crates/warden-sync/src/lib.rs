//! # warden-sync
//!
//! Control-plane sync of account tokens with a live NATS cluster.
//!
//! The set of live nodes is not known in advance, so requests are published
//! on well-known system subjects and every node that runs a full account
//! resolver answers on the request's reply inbox. Answers are collected
//! until the first gap in a one-second window:
//!
//! ```text
//!  Warden                         NATS cluster
//!    │  subscribe(_INBOX.x)            │
//!    │  pub $SYS.REQ.CLAIMS.UPDATE ──▶ │ node-a, node-b, node-c
//!    │ ◀── reply (node-a)              │
//!    │ ◀── reply (node-b)              │
//!    │  ... no reply before deadline   │
//!    ▼  window closes: 2 nodes         │
//! ```
//!
//! The count is a lower bound of the cluster size: nodes answering after the
//! window closes are not counted.

pub mod cache;
pub mod connection;
pub mod control;
pub mod error;
pub mod fanin;
pub mod message;
pub mod nats;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use cache::{ClientCache, ConnectionKey};
pub use connection::{Connection, Connector, ReplySubscription, UserCredentials};
pub use control::{ControlPlane, Rejection, SyncReport, SyncStatus};
pub use error::SyncError;
pub use fanin::collect_responses;
pub use message::{ApiError, DELETE_SUBJECT, MalformedResponse, ServerInfo, ServerResponse, UPDATE_SUBJECT};
pub use nats::NatsConnector;
