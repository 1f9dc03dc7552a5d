//! Pending-login registry: the single source of truth for deferred logins
//! awaiting an administrator's decision.
//!
//! Entries are process-local and never persisted. `resolve` removes on first
//! lookup, which is what makes a decision exactly-once: a second call for the
//! same id finds nothing. Stale entries are swept by a background task and
//! entries whose designated approver disconnects are rejected eagerly instead
//! of sitting in the map forever.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub approval_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    /// The waiting client's live connection, attached best-effort after
    /// creation. A decision may arrive before this is ever filled in; the
    /// outcome push is simply skipped then.
    pub requester_connection_id: Option<Uuid>,
    /// The admin session that was notified of this request.
    pub approver_connection_id: Uuid,
    created_at: Instant,
}

pub struct PendingLoginRegistry {
    inner: Mutex<HashMap<Uuid, PendingLogin>>,
}

impl PendingLoginRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a fresh pending entry and return its approval id. Never fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        display_name: &str,
        approver_connection_id: Uuid,
    ) -> Uuid {
        let approval_id = Uuid::now_v7();
        let mut inner = self.inner.lock().await;
        inner.insert(
            approval_id,
            PendingLogin {
                approval_id,
                user_id,
                display_name: display_name.to_string(),
                requester_connection_id: None,
                approver_connection_id,
                created_at: Instant::now(),
            },
        );
        approval_id
    }

    /// Attach the requester's live connection. Silently ignored when the
    /// entry has already been resolved — this is best-effort enrichment.
    pub async fn attach_requester(&self, approval_id: Uuid, connection_id: Uuid) {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.get_mut(&approval_id) {
            entry.requester_connection_id = Some(connection_id);
        }
    }

    /// Look up and remove atomically. `None` means unknown, expired, or
    /// already handled — callers report that distinctly from a decision.
    pub async fn resolve(&self, approval_id: Uuid) -> Option<PendingLogin> {
        let mut inner = self.inner.lock().await;
        inner.remove(&approval_id)
    }

    /// Remove and return every entry older than `ttl`.
    pub async fn expire_stale(&self, ttl: Duration) -> Vec<PendingLogin> {
        let mut inner = self.inner.lock().await;
        let stale: Vec<Uuid> = inner
            .iter()
            .filter(|(_, entry)| entry.created_at.elapsed() > ttl)
            .map(|(id, _)| *id)
            .collect();
        stale
            .into_iter()
            .filter_map(|id| inner.remove(&id))
            .collect()
    }

    /// Remove and return every entry that was waiting on the given approver
    /// connection. Called when an admin session disconnects mid-flight.
    pub async fn reject_for_approver(&self, approver_connection_id: Uuid) -> Vec<PendingLogin> {
        let mut inner = self.inner.lock().await;
        let stuck: Vec<Uuid> = inner
            .iter()
            .filter(|(_, entry)| entry.approver_connection_id == approver_connection_id)
            .map(|(id, _)| *id)
            .collect();
        stuck
            .into_iter()
            .filter_map(|id| inner.remove(&id))
            .collect()
    }

    #[cfg(test)]
    pub async fn backdate(&self, approval_id: Uuid, age: Duration) {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.get_mut(&approval_id) {
            entry.created_at = Instant::now() - age;
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl Default for PendingLoginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_succeeds_exactly_once() {
        let registry = PendingLoginRegistry::new();
        let user = Uuid::now_v7();
        let id = registry.create(user, "Dana", Uuid::now_v7()).await;

        let entry = registry.resolve(id).await.expect("first resolve");
        assert_eq!(entry.user_id, user);
        assert_eq!(entry.display_name, "Dana");
        assert!(entry.requester_connection_id.is_none());

        assert!(registry.resolve(id).await.is_none());
    }

    #[tokio::test]
    async fn resolve_unknown_id_is_none() {
        let registry = PendingLoginRegistry::new();
        assert!(registry.resolve(Uuid::now_v7()).await.is_none());
    }

    #[tokio::test]
    async fn attach_requester_enriches_pending_entry() {
        let registry = PendingLoginRegistry::new();
        let id = registry.create(Uuid::now_v7(), "Dana", Uuid::now_v7()).await;
        let conn = Uuid::now_v7();

        registry.attach_requester(id, conn).await;
        let entry = registry.resolve(id).await.unwrap();
        assert_eq!(entry.requester_connection_id, Some(conn));
    }

    #[tokio::test]
    async fn attach_after_resolve_is_silent_noop() {
        let registry = PendingLoginRegistry::new();
        let id = registry.create(Uuid::now_v7(), "Dana", Uuid::now_v7()).await;
        registry.resolve(id).await.unwrap();

        registry.attach_requester(id, Uuid::now_v7()).await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn expire_stale_removes_only_old_entries() {
        let registry = PendingLoginRegistry::new();
        let old = registry.create(Uuid::now_v7(), "Old", Uuid::now_v7()).await;
        let fresh = registry.create(Uuid::now_v7(), "Fresh", Uuid::now_v7()).await;
        registry.backdate(old, Duration::from_secs(600)).await;

        let expired = registry.expire_stale(Duration::from_secs(300)).await;
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].approval_id, old);

        assert!(registry.resolve(fresh).await.is_some());
    }

    #[tokio::test]
    async fn approver_disconnect_drains_their_requests() {
        let registry = PendingLoginRegistry::new();
        let approver = Uuid::now_v7();
        let other_approver = Uuid::now_v7();
        let a = registry.create(Uuid::now_v7(), "A", approver).await;
        let b = registry.create(Uuid::now_v7(), "B", approver).await;
        let c = registry.create(Uuid::now_v7(), "C", other_approver).await;

        let mut drained: Vec<Uuid> = registry
            .reject_for_approver(approver)
            .await
            .into_iter()
            .map(|entry| entry.approval_id)
            .collect();
        drained.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(drained, expected);

        assert!(registry.resolve(c).await.is_some());
    }
}
