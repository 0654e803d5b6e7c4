//! Per-player-tag serialization of sync operations.
//!
//! [`TagLocks`] hands out one [`tokio::sync::Mutex`] per player tag, stored in
//! a `HashMap`. Track and update calls for the same tag queue behind each
//! other so the dedup check and the battle insert cannot interleave; calls
//! for different tags run concurrently.
//!
//! Entries live only while someone holds or waits for them: dropping the
//! last [`TagGuard`] for a tag removes its mutex from the map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::PlayerTag;

type LockMap = HashMap<PlayerTag, Arc<Mutex<()>>>;

/// Registry of per-tag mutexes.
///
/// # Concurrency
///
/// - Operations on different tags never wait on each other.
/// - Operations on the same tag are serialized in acquisition order.
/// - The map is only touched synchronously, never across an `.await`.
#[derive(Debug, Default)]
pub struct TagLocks {
    locks: StdMutex<LockMap>,
}

impl TagLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for exclusive access to `tag`. The lock is held until the
    /// returned guard is dropped.
    pub async fn acquire(&self, tag: &PlayerTag) -> TagGuard<'_> {
        // The Arc is cloned under the map lock, so a releasing guard sees
        // this waiter in the strong count and keeps the entry.
        let lock = Arc::clone(self.map().entry(tag.clone()).or_default());
        let guard = lock.lock_owned().await;
        TagGuard {
            registry: self,
            tag: tag.clone(),
            guard: Some(guard),
        }
    }

    fn release(&self, tag: &PlayerTag) {
        let mut map = self.map();
        if map.get(tag).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(tag);
        }
    }

    /// Returns the number of tags currently held or waited on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map().len()
    }

    /// Returns `true` if no tag is held or waited on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}

/// Exclusive access to one tag, released on drop.
#[derive(Debug)]
pub struct TagGuard<'a> {
    registry: &'a TagLocks,
    tag: PlayerTag,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TagGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the guard's own Arc no longer counts.
        drop(self.guard.take());
        self.registry.release(&self.tag);
    }
}
