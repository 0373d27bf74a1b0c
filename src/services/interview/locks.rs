//! Per-session mutual exclusion
//!
//! Every mutating operation on a session holds that session's lock from the
//! first read until the write is committed. Sessions never share a lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per session token
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `token`.
    pub async fn acquire(&self, token: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the DashMap shard is released before awaiting
        let lock = self
            .locks
            .entry(token.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted session.
    pub fn forget(&self, token: &str) {
        self.locks.remove(token);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
