use crate::domain::SessionStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: i64,
    expires_at: Instant,
}

/// Process-local session store. Sessions do not survive a restart.
#[derive(Debug)]
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i64) -> Uuid {
        let session_id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        // Sweep on write so abandoned sessions do not pile up.
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            session_id,
            Session {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        tracing::debug!(user_id, live_sessions = sessions.len(), "Session created");
        session_id
    }

    async fn user_id(&self, session_id: Uuid) -> Option<i64> {
        let session = self.sessions.read().await.get(&session_id).copied()?;
        if session.expires_at > Instant::now() {
            return Some(session.user_id);
        }
        self.sessions.write().await.remove(&session_id);
        tracing::debug!(user_id = session.user_id, "Session expired");
        None
    }

    async fn destroy(&self, session_id: Uuid) {
        if let Some(session) = self.sessions.write().await.remove(&session_id) {
            tracing::debug!(user_id = session.user_id, "Session destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_resolve_until_destroyed() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let id = store.create(7).await;
        assert_eq!(store.user_id(id).await, Some(7));
        assert_eq!(store.user_id(Uuid::new_v4()).await, None);

        store.destroy(id).await;
        assert_eq!(store.user_id(id).await, None);
    }

    #[tokio::test]
    async fn expired_sessions_are_anonymous() {
        let store = MemorySessionStore::new(Duration::ZERO);
        let id = store.create(7).await;
        assert_eq!(store.user_id(id).await, None);
        assert!(store.sessions.read().await.is_empty());
    }
}
