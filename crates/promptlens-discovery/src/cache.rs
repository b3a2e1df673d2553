//! Bounded, mtime-validated discovery cache
//!
//! Entries are keyed by directory path and only served while the directory's
//! modification time still matches the one recorded at insertion. Recency is a
//! logical counter rather than wall-clock time, so two accesses in the same
//! instant never tie.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Maximum number of cached directories
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    items: T,
    mtime: u64,
    last_accessed: u64,
}

#[derive(Debug)]
struct CacheState<T> {
    entries: HashMap<String, CacheEntry<T>>,
    counter: u64,
}

impl<T> CacheState<T> {
    fn next_tick(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn evict_least_recent(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }
}

/// LRU cache of per-directory discovery results
///
/// Every call completes under a short internal lock, so one instance can be
/// shared through an `Arc` by concurrently running discovery branches.
#[derive(Debug)]
pub struct DiscoveryCache<T> {
    state: Mutex<CacheState<T>>,
    capacity: usize,
}

impl<T: Clone> DiscoveryCache<T> {
    /// Create a cache holding at most [`DEFAULT_CACHE_CAPACITY`] entries
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a cache with a custom capacity (minimum 1)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                counter: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Return the cached items for `key` if they were stored at `current_mtime`.
    ///
    /// A stale entry is removed, so a later lookup with the old mtime misses too.
    pub fn get(&self, key: &str, current_mtime: u64) -> Option<T> {
        let mut state = self.state.lock();
        let stored_mtime = state.entries.get(key)?.mtime;
        if stored_mtime != current_mtime {
            state.entries.remove(key);
            return None;
        }
        let tick = state.next_tick();
        let entry = state.entries.get_mut(key)?;
        entry.last_accessed = tick;
        Some(entry.items.clone())
    }

    /// Insert or refresh `key`. A new key at capacity evicts the least recently used entry.
    pub fn set(&self, key: impl Into<String>, items: T, mtime: u64) {
        let key = key.into();
        let mut state = self.state.lock();
        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            state.evict_least_recent();
        }
        let last_accessed = state.next_tick();
        state.entries.insert(
            key,
            CacheEntry {
                items,
                mtime,
                last_accessed,
            },
        );
    }

    /// Drop one entry
    pub fn invalidate(&self, key: &str) {
        self.state.lock().entries.remove(key);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Number of cached entries
    #[must_use]
    pub fn size(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Maximum number of entries
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> Default for DiscoveryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let cache = DiscoveryCache::new();
        cache.set("/dir", vec!["a".to_string()], 10);
        assert_eq!(cache.get("/dir", 10), Some(vec!["a".to_string()]));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_mtime_mismatch_removes_entry() {
        let cache = DiscoveryCache::new();
        cache.set("/dir", 1u32, 10);
        assert_eq!(cache.get("/dir", 11), None);
        assert_eq!(cache.get("/dir", 10), None);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_missing_key() {
        let cache: DiscoveryCache<u32> = DiscoveryCache::new();
        assert_eq!(cache.get("/nothing", 1), None);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = DiscoveryCache::new();
        for i in 0..DEFAULT_CACHE_CAPACITY {
            cache.set(format!("/dir/{i}"), i, 1);
        }
        assert_eq!(cache.size(), 50);

        // Touch the oldest entry so /dir/1 becomes the eviction victim
        assert_eq!(cache.get("/dir/0", 1), Some(0));

        cache.set("/dir/new", 999, 1);
        assert_eq!(cache.size(), 50);
        assert_eq!(cache.get("/dir/1", 1), None);
        assert_eq!(cache.get("/dir/0", 1), Some(0));
        assert_eq!(cache.get("/dir/new", 1), Some(999));
    }

    #[test]
    fn test_refreshing_existing_key_does_not_evict() {
        let cache = DiscoveryCache::with_capacity(2);
        cache.set("a", 1, 1);
        cache.set("b", 2, 1);
        cache.set("a", 3, 2);
        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("a", 2), Some(3));
        assert_eq!(cache.get("b", 1), Some(2));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = DiscoveryCache::new();
        cache.set("a", 1, 1);
        cache.set("b", 2, 1);
        cache.invalidate("a");
        assert_eq!(cache.get("a", 1), None);
        assert_eq!(cache.size(), 1);
        cache.clear();
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
