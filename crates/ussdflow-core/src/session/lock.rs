//! In-process per-session advisory locks.
//!
//! Holding a [`SessionGuard`] for the whole handling of one inbound message
//! keeps a double submission for the same session from interleaving its
//! value and cursor writes. Only requests within this process are
//! serialized.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use ussdflow_types::session::SessionId;

/// One async mutex per session id currently being handled.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    inner: Arc<DashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other request holds `id`, then hold it until the guard drops.
    pub async fn acquire(&self, id: &SessionId) -> SessionGuard {
        // The map entry must not be held across the await.
        let mutex = self.inner.entry(id.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;
        SessionGuard {
            id: id.clone(),
            locks: Arc::clone(&self.inner),
            guard: Some(guard),
        }
    }

    /// Number of sessions with a live lock entry.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Releases the session on drop and forgets the entry once nobody waits on it.
pub struct SessionGuard {
    id: SessionId,
    locks: Arc<DashMap<SessionId, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
