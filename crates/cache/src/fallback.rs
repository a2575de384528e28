//! In-process fallback tier — a bounded LRU with lazy TTL expiry.
//!
//! This is the only shared mutable in-process structure in the subsystem.
//! One mutex covers lookup, insert, and eviction as a single coherent
//! operation, so concurrent requests cannot lose updates. Operations here
//! cannot fail.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

struct Entry {
    value: String,
    inserted_at: Instant,
    /// Monotonic access stamp; the smallest stamp is the LRU entry.
    last_used: u64,
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

struct Inner {
    entries: HashMap<String, Entry>,
    tick: u64,
}

/// A bounded in-process cache with strict LRU eviction by access order.
///
/// TTL expiry is lazy: an expired entry is deleted when it is next read and
/// reported absent. Capacity is enforced on insert.
pub struct FallbackCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl FallbackCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                tick: 0,
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock still holds structurally valid data.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a key, refreshing its recency on hit.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.lock();

        if inner.entries.get(key).is_some_and(|e| e.is_expired(self.ttl)) {
            inner.entries.remove(key);
            return None;
        }

        inner.tick += 1;
        let tick = inner.tick;
        let entry = inner.entries.get_mut(key)?;
        entry.last_used = tick;
        Some(entry.value.clone())
    }

    /// Insert or overwrite a key, evicting the least-recently-used entry
    /// when over capacity.
    pub fn set(&self, key: &str, value: &str) {
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                inserted_at: Instant::now(),
                last_used: tick,
            },
        );

        while inner.entries.len() > self.capacity {
            // Capacity is small (hundreds), a linear scan is fine.
            let lru = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            match lru {
                Some(k) => {
                    inner.entries.remove(&k);
                }
                None => break,
            }
        }
    }

    /// Remove every entry whose key starts with `prefix`.
    pub fn clear_prefix(&self, prefix: &str) {
        self.lock().entries.retain(|k, _| !k.starts_with(prefix));
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> FallbackCache {
        FallbackCache::new(capacity, Duration::from_secs(600))
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = cache(10);
        cache.set("resp:t1:hours:abc", "open 9-5");
        assert_eq!(cache.get("resp:t1:hours:abc").as_deref(), Some("open 9-5"));
        assert_eq!(cache.get("resp:t1:hours:missing"), None);
    }

    #[tokio::test]
    async fn overflow_evicts_exactly_the_lru_keys() {
        let cache = cache(5);
        for i in 0..8 {
            cache.set(&format!("key-{i}"), "v");
        }

        assert_eq!(cache.len(), 5);
        // The three oldest inserts are gone, the rest survive.
        for i in 0..3 {
            assert_eq!(cache.get(&format!("key-{i}")), None, "key-{i} should be evicted");
        }
        for i in 3..8 {
            assert!(cache.get(&format!("key-{i}")).is_some(), "key-{i} should survive");
        }
    }

    #[tokio::test]
    async fn reads_refresh_recency() {
        let cache = cache(3);
        cache.set("a", "1");
        cache.set("b", "2");
        cache.set("c", "3");

        // Touch "a" so "b" becomes the LRU entry.
        cache.get("a");
        cache.set("d", "4");

        assert!(cache.get("a").is_some());
        assert_eq!(cache.get("b"), None);
        assert!(cache.get("c").is_some());
        assert!(cache.get("d").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_vanish_on_read() {
        let cache = FallbackCache::new(10, Duration::from_secs(60));
        cache.set("k", "v");

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(cache.get("k").is_some());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.get("k"), None);
        // Lazy deletion actually removed it.
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn clear_prefix_only_hits_matching_keys() {
        let cache = cache(10);
        cache.set("resp:t1:hours:a", "x");
        cache.set("resp:t1:other:b", "y");
        cache.set("resp:t2:hours:c", "z");

        cache.clear_prefix("resp:t1:");
        assert_eq!(cache.len(), 1);
        assert!(cache.get("resp:t2:hours:c").is_some());
    }

    #[tokio::test]
    async fn overwrite_does_not_grow_the_cache() {
        let cache = cache(2);
        cache.set("a", "1");
        cache.set("a", "2");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").as_deref(), Some("2"));
    }
}
