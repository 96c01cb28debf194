use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Per-asset async mutexes. Update and Delete on one id run one at a time;
/// different ids never wait on each other.
#[derive(Debug, Clone)]
pub struct AssetLocks {
    enabled: bool,
    locks: Arc<LockMap>,
}

impl AssetLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub async fn acquire(&self, id: &str) -> AssetLockGuard {
        if !self.enabled {
            return AssetLockGuard {
                locks: Arc::clone(&self.locks),
                id: id.to_string(),
                guard: None,
            };
        }

        let mutex = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;

        AssetLockGuard {
            locks: Arc::clone(&self.locks),
            id: id.to_string(),
            guard: Some(guard),
        }
    }

    /// Ids with a live lock entry
    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}

pub struct AssetLockGuard {
    locks: Arc<LockMap>,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AssetLockGuard {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            drop(guard);
            // Only the map still holds the mutex: nobody is waiting on it.
            self.locks
                .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
        }
    }
}
