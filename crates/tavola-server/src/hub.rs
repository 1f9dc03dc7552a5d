//! Live connection registry and push channel.
//!
//! Every WebSocket connection is registered here with a connection id and an
//! unbounded sender; `publish` is fire-and-forget. Admin-role connections
//! double as the active approver registry: the first-connected admin session
//! is the approver of record for deferred logins.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use tavola_core::PublicUser;

/// Events pushed to specific connections.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    LoginApprovalRequest {
        approval_id: Uuid,
        requester_name: String,
    },
    LoginApproved {
        user: PublicUser,
        token: String,
    },
    LoginRejected {
        message: String,
    },
}

struct Connection {
    user_id: Option<Uuid>,
    /// Lower-cased email supplied by a not-yet-authenticated client waiting
    /// on approval, or taken from the session token.
    identity: Option<String>,
    is_admin: bool,
    /// Monotonic registration order; "first-connected admin wins" ties on
    /// this rather than on wall-clock time.
    seq: u64,
    tx: mpsc::UnboundedSender<Event>,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<Uuid, Connection>,
    next_seq: u64,
}

pub struct Hub {
    inner: Mutex<Inner>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Register a live connection; returns its id and the receiving half of
    /// its push channel.
    pub async fn register(
        &self,
        user_id: Option<Uuid>,
        identity: Option<String>,
        is_admin: bool,
    ) -> (Uuid, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = Uuid::now_v7();
        let mut inner = self.inner.lock().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.connections.insert(
            connection_id,
            Connection {
                user_id,
                identity: identity.map(|value| value.to_lowercase()),
                is_admin,
                seq,
                tx,
            },
        );
        (connection_id, rx)
    }

    /// Remove a connection; returns whether it was an admin session so the
    /// caller can reject approvals that were waiting on it.
    pub async fn unregister(&self, connection_id: Uuid) -> bool {
        let mut inner = self.inner.lock().await;
        inner
            .connections
            .remove(&connection_id)
            .map(|conn| conn.is_admin)
            .unwrap_or(false)
    }

    /// Fire-and-forget push; returns whether the connection was reachable.
    pub async fn publish(&self, connection_id: Uuid, event: Event) -> bool {
        let inner = self.inner.lock().await;
        match inner.connections.get(&connection_id) {
            Some(conn) => conn.tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Find the live connection of a waiting client by its identity marker.
    pub async fn lookup_by_identity(&self, email: &str) -> Option<Uuid> {
        let needle = email.to_lowercase();
        let inner = self.inner.lock().await;
        inner
            .connections
            .iter()
            .filter(|(_, conn)| conn.identity.as_deref() == Some(needle.as_str()))
            .min_by_key(|(_, conn)| conn.seq)
            .map(|(id, _)| *id)
    }

    /// First-registered admin session that belongs to a *different* user.
    /// `None` means the login may proceed directly.
    pub async fn first_admin_excluding(&self, user_id: Uuid) -> Option<Uuid> {
        let inner = self.inner.lock().await;
        inner
            .connections
            .iter()
            .filter(|(_, conn)| conn.is_admin && conn.user_id != Some(user_id))
            .min_by_key(|(_, conn)| conn.seq)
            .map(|(id, _)| *id)
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
