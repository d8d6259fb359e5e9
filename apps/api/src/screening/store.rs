use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::screening::driver::Session;

/// Upper bound on the gap between idle sweeps.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    session: Arc<Mutex<Session>>,
    last_active: Instant,
}

/// In-memory registry of live screening sessions.
///
/// Each session sits behind its own mutex so inputs to one session are applied
/// one at a time while different sessions proceed independently. Sessions not
/// looked up within the idle TTL are dropped by `evict_idle`.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh session and returns a snapshot of it.
    pub async fn create(&self) -> Session {
        let session = Session::new();
        let snapshot = session.clone();
        self.sessions.write().await.insert(
            session.id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_active: Instant::now(),
            },
        );
        info!("Session {} created", snapshot.id);
        snapshot
    }

    /// Looks up a session and marks it active.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_active = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Returns false when the id was unknown.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Session {id} discarded");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for at least `ttl` and returns how many went.
    /// A session whose mutex is held by an in-flight request is kept.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            now.duration_since(entry.last_active) < ttl || entry.session.try_lock().is_err()
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle sessions ({} live)", sessions.len());
        }
        evicted
    }

    /// Runs `evict_idle` on a fixed interval for the life of the process.
    pub fn spawn_idle_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let every = ttl.clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            info!("Idle session sweeper started (ttl {ttl:?}, every {every:?})");
            loop {
                ticker.tick().await;
                debug!("Sweeping idle sessions");
                store.evict_idle(ttl).await;
            }
        })
    }
}
