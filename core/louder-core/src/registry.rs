//! Bounded session membership sets.
//!
//! Each debouncer owns two of these: one for sessions with recent activity
//! and one for sessions that were already notified. Sizes are capped so a
//! long-lived listener cannot grow without bound; the entry that was added
//! or refreshed longest ago is evicted first.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Default number of sessions tracked per set.
pub const DEFAULT_CAPACITY: usize = 100;

/// A capacity-limited set of session IDs with least-recently-added eviction.
///
/// `add` on an existing key moves it to the most recent position without
/// growing the set. `has` never changes the order.
pub struct ActivityRegistry {
    entries: LruCache<String, ()>,
}

impl Default for ActivityRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ActivityRegistry {
    /// Creates a registry holding at most `capacity` keys (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Inserts or refreshes `key`, evicting the oldest entry on overflow.
    pub fn add(&mut self, key: &str) {
        if let Some((evicted, ())) = self.entries.push(key.to_string(), ()) {
            if evicted != key {
                tracing::debug!(session = %evicted, "Evicted session from registry");
            }
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.pop(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}
