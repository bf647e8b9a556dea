//! In-memory connection with scripted cluster nodes.
//!
//! Every request published on a [`MockConnection`] is answered by each
//! configured [`MockNode`] on the request's reply subject, optionally after a
//! delay. Published requests are recorded for assertions.

use crate::connection::{Connection, Connector, ReplySubscription, UserCredentials};
use crate::error::SyncError;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use warden_core::SyncConfig;

#[derive(Debug, Clone)]
enum Reply {
    Accept,
    Reject { code: i64, description: String },
    Raw(Bytes),
}

/// A scripted node that answers every request.
#[derive(Debug, Clone)]
pub struct MockNode {
    name: String,
    reply: Reply,
    delay: Duration,
}

impl MockNode {
    /// A node that replies with a `data` member.
    pub fn accepting(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: Reply::Accept,
            delay: Duration::ZERO,
        }
    }

    /// A node that replies with an `error` member.
    pub fn rejecting(name: &str, code: i64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: Reply::Reject {
                code,
                description: description.to_string(),
            },
            delay: Duration::ZERO,
        }
    }

    /// A node that replies with a body that is not JSON.
    pub fn malformed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: Reply::Raw(Bytes::from_static(b"\x00garbage")),
            delay: Duration::ZERO,
        }
    }

    /// A node whose reply lacks a server name.
    pub fn unnamed() -> Self {
        Self {
            name: String::new(),
            reply: Reply::Accept,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn render(&self, subject: &str) -> Bytes {
        let server = json!({"name": self.name, "host": "127.0.0.1", "id": format!("N{}", self.name.to_uppercase())});
        let body = match &self.reply {
            Reply::Accept => json!({
                "server": server,
                "data": {"code": 200, "message": format!("{subject} handled")},
            }),
            Reply::Reject { code, description } => json!({
                "server": server,
                "error": {"code": code, "description": description},
            }),
            Reply::Raw(bytes) => return bytes.clone(),
        };
        Bytes::from(body.to_string())
    }
}

/// A request seen by the mock.
#[derive(Debug, Clone)]
pub struct PublishedRequest {
    pub subject: String,
    pub reply: String,
    pub payload: Bytes,
}

/// Connection whose cluster is a fixed set of [`MockNode`]s.
pub struct MockConnection {
    nodes: Vec<MockNode>,
    inboxes: Mutex<HashMap<String, mpsc::UnboundedSender<Bytes>>>,
    published: Mutex<Vec<PublishedRequest>>,
    next_inbox: AtomicUsize,
}

impl MockConnection {
    pub fn new(nodes: Vec<MockNode>) -> Self {
        Self {
            nodes,
            inboxes: Mutex::new(HashMap::new()),
            published: Mutex::new(Vec::new()),
            next_inbox: AtomicUsize::new(0),
        }
    }

    /// Requests published so far, oldest first.
    pub fn published(&self) -> Vec<PublishedRequest> {
        self.published.lock().unwrap().clone()
    }

    /// Requests published on `subject`.
    pub fn published_on(&self, subject: &str) -> Vec<PublishedRequest> {
        self.published()
            .into_iter()
            .filter(|r| r.subject == subject)
            .collect()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn new_inbox(&self) -> String {
        let n = self.next_inbox.fetch_add(1, Ordering::SeqCst);
        format!("_INBOX.mock.{n}")
    }

    async fn subscribe(&self, subject: &str) -> Result<Box<dyn ReplySubscription>, SyncError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inboxes
            .lock()
            .unwrap()
            .insert(subject.to_string(), sender);
        Ok(Box::new(MockSubscription { receiver }))
    }

    async fn publish_request(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), SyncError> {
        self.published.lock().unwrap().push(PublishedRequest {
            subject: subject.to_string(),
            reply: reply.to_string(),
            payload,
        });

        let Some(sender) = self.inboxes.lock().unwrap().get(reply).cloned() else {
            return Ok(());
        };
        for node in &self.nodes {
            let sender = sender.clone();
            let delay = node.delay;
            let body = node.render(subject);
            tokio::spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let _ = sender.send(body);
            });
        }
        Ok(())
    }
}

struct MockSubscription {
    receiver: mpsc::UnboundedReceiver<Bytes>,
}

#[async_trait]
impl ReplySubscription for MockSubscription {
    async fn next_message(&mut self, timeout: Duration) -> Result<Option<Bytes>, SyncError> {
        match tokio::time::timeout(timeout, self.receiver.recv()).await {
            Ok(Some(bytes)) => Ok(Some(bytes)),
            // The sender lives in the connection, so a closed channel only
            // happens once the connection is gone.
            Ok(None) => Err(SyncError::ConnectionClosed),
            Err(_) => Ok(None),
        }
    }
}

/// Connector handing out one shared [`MockConnection`].
pub struct MockConnector {
    connection: Arc<MockConnection>,
    fail: bool,
    connects: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new(nodes: Vec<MockNode>) -> Self {
        Self {
            connection: Arc::new(MockConnection::new(nodes)),
            fail: false,
            connects: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// A connector whose every connection attempt fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn connection(&self) -> Arc<MockConnection> {
        self.connection.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// URLs connected to, oldest first.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        url: &str,
        _credentials: &UserCredentials,
        _config: &SyncConfig,
    ) -> Result<Arc<dyn Connection>, SyncError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(SyncError::ConnectFailed {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.connection.clone())
    }
}
