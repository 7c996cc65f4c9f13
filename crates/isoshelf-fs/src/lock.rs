use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = HashMap<PathBuf, Weak<AsyncMutex<()>>>;

/// Per-path mutual exclusion shared by concurrent update jobs.
///
/// Cloning shares the same lock table. Entries are dropped once no guard or
/// waiter refers to them.
#[derive(Debug, Clone, Default)]
pub struct PathLocks {
    slots: Arc<Mutex<Slots>>,
}

/// Holds the lock for one path until dropped.
#[derive(Debug)]
pub struct PathGuard {
    path:   PathBuf,
    _guard: OwnedMutexGuard<()>,
}

impl PathGuard {
    pub fn path(&self) -> &Path { &self.path }
}

impl PathLocks {
    pub fn new() -> Self { Self::default() }

    /// Wait until `path` is free and take it.
    pub async fn lock(&self, path: impl AsRef<Path>) -> PathGuard {
        let path = path.as_ref().to_path_buf();
        let slot = self.slot(&path);
        PathGuard {
            path,
            _guard: slot.lock_owned().await,
        }
    }

    /// Take `path` only if nobody holds it.
    pub fn try_lock(&self, path: impl AsRef<Path>) -> Option<PathGuard> {
        let path = path.as_ref().to_path_buf();
        let slot = self.slot(&path);
        let guard = slot.try_lock_owned().ok()?;
        Some(PathGuard { path, _guard: guard })
    }

    fn slot(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, weak| weak.strong_count() > 0);

        if let Some(existing) = slots.get(path).and_then(Weak::upgrade) {
            return existing;
        }
        let fresh = Arc::new(AsyncMutex::new(()));
        slots.insert(path.to_path_buf(), Arc::downgrade(&fresh));
        fresh
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|w| w.strong_count() > 0).count()
    }
}
