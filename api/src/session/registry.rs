use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::state::Session;

/// Bounds on how many sessions are kept and for how long.
#[derive(Clone, Copy, Debug)]
pub struct SessionLimits {
    /// A session untouched for longer than this is dropped.
    pub idle_ttl: Duration,
    /// When full, creating a session evicts the least recently used one.
    pub max_sessions: usize,
}

struct Entry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
    /// Monotonic use counter, orders entries for LRU eviction.
    tick: u64,
}

#[derive(Default)]
struct Sessions {
    map: HashMap<Uuid, Entry>,
    clock: u64,
}

impl Sessions {
    fn sweep(&mut self, ttl: Duration, now: Instant) -> usize {
        let before = self.map.len();
        self.map
            .retain(|_, e| now.saturating_duration_since(e.last_seen) <= ttl);
        before - self.map.len()
    }

    fn evict_lru(&mut self) -> Option<Uuid> {
        let oldest = self.map.iter().min_by_key(|(_, e)| e.tick).map(|(id, _)| *id)?;
        self.map.remove(&oldest);
        Some(oldest)
    }
}

/// All live sessions, keyed by the id stored in the session cookie.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<Sessions>>,
    max_turns: usize,
    limits: SessionLimits,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("max_turns", &self.max_turns)
            .field("limits", &self.limits)
            .finish()
    }
}

impl SessionRegistry {
    pub fn new(max_turns: usize, limits: SessionLimits) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Sessions::default())),
            max_turns,
            limits,
        }
    }

    /// Session for `id`, or a fresh one. The flag is `true` when it was created.
    ///
    /// Expired sessions are dropped first, so a cookie naming one gets a fresh
    /// session under the same id.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Arc<Mutex<Session>>, bool) {
        let now = Instant::now();
        let mut guard = self.inner.write().await;
        let sessions = &mut *guard;

        let expired = sessions.sweep(self.limits.idle_ttl, now);
        if expired > 0 {
            info!(expired, live = sessions.map.len(), "idle sessions dropped");
        }

        sessions.clock += 1;
        let tick = sessions.clock;

        let id = id.unwrap_or_else(Uuid::new_v4);
        if let Some(e) = sessions.map.get_mut(&id) {
            e.last_seen = now;
            e.tick = tick;
            return (id, Arc::clone(&e.session), false);
        }

        while sessions.map.len() >= self.limits.max_sessions.max(1) {
            match sessions.evict_lru() {
                Some(evicted) => debug!(%evicted, "least recently used session evicted"),
                None => break,
            }
        }

        let session = Arc::new(Mutex::new(Session::new(id, self.max_turns)));
        sessions.map.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_seen: now,
                tick,
            },
        );
        debug!(%id, sessions = sessions.map.len(), "session created");
        (id, session, true)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        self.inner
            .read()
            .await
            .map
            .get(&id)
            .map(|e| Arc::clone(&e.session))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(idle_ttl: Duration, max_sessions: usize) -> SessionLimits {
        SessionLimits {
            idle_ttl,
            max_sessions,
        }
    }

    fn roomy() -> SessionRegistry {
        SessionRegistry::new(4, limits(Duration::from_secs(3600), 100))
    }

    #[tokio::test]
    async fn same_id_returns_same_session() {
        let reg = roomy();
        let (id, first, created) = reg.get_or_create(None).await;
        assert!(created);

        let (again, second, created) = reg.get_or_create(Some(id)).await;
        assert!(!created);
        assert_eq!(again, id);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_id_is_adopted() {
        let reg = roomy();
        let id = Uuid::new_v4();
        let (got, _, created) = reg.get_or_create(Some(id)).await;
        assert!(created);
        assert_eq!(got, id);
        assert!(reg.get(id).await.is_some());
    }

    #[tokio::test]
    async fn full_registry_evicts_least_recently_used() {
        let reg = SessionRegistry::new(4, limits(Duration::from_secs(3600), 2));
        let (a, _, _) = reg.get_or_create(None).await;
        let (b, _, _) = reg.get_or_create(None).await;
        reg.get_or_create(Some(a)).await;

        let (c, _, created) = reg.get_or_create(None).await;
        assert!(created);
        assert_eq!(reg.len().await, 2);
        assert!(reg.get(a).await.is_some());
        assert!(reg.get(b).await.is_none());
        assert!(reg.get(c).await.is_some());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let reg = SessionRegistry::new(4, limits(Duration::from_millis(50), 100));
        let (stale, old, _) = reg.get_or_create(None).await;
        old.lock().await.focus_page = Some(3);

        tokio::time::sleep(Duration::from_millis(120)).await;

        let (fresh, _, _) = reg.get_or_create(None).await;
        assert_ne!(fresh, stale);
        assert!(reg.get(stale).await.is_none());
        assert_eq!(reg.len().await, 1);

        let (again, session, created) = reg.get_or_create(Some(stale)).await;
        assert!(created);
        assert_eq!(again, stale);
        assert_eq!(session.lock().await.focus_page, None);
    }
}
