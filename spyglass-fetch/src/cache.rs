//! In-memory response cache keyed by resolved URL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    expires_at: u64,
}

/// Decoded payloads of successful responses, each with an expiry.
///
/// An entry is live while `now < expires_at`. Expired entries are treated
/// as misses and dropped on the next read. The lock is only ever held for
/// the synchronous lookup or insert.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Creates an empty cache reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the live payload for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `payload` under `key` for `ttl`, replacing any earlier entry.
    pub fn insert(&self, key: impl Into<String>, payload: Value, ttl: Duration) {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let expires_at = self.clock.now_millis().saturating_add(ttl_ms);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), CacheEntry {
                payload,
                expires_at,
            });
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of stored entries, live or not yet evicted.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn cache() -> (ResponseCache, ManualClock) {
        let clock = ManualClock::new();
        (ResponseCache::new(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_hit_within_ttl() {
        let (cache, clock) = cache();
        cache.insert("/api/asin", json!([1, 2]), Duration::from_secs(30));

        clock.advance(Duration::from_millis(29_999));
        assert_eq!(cache.get("/api/asin"), Some(json!([1, 2])));
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let (cache, clock) = cache();
        cache.insert("/api/asin", json!({"id": 1}), Duration::from_secs(30));

        clock.advance(Duration::from_secs(30));
        assert_eq!(cache.get("/api/asin"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_overwrites_and_refreshes() {
        let (cache, clock) = cache();
        cache.insert("k", json!(1), Duration::from_secs(1));
        clock.advance(Duration::from_millis(900));
        cache.insert("k", json!(2), Duration::from_secs(1));
        clock.advance(Duration::from_millis(900));

        assert_eq!(cache.get("k"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let (cache, _clock) = cache();
        cache.insert("a", json!(null), Duration::from_secs(5));
        cache.insert("b", json!(null), Duration::from_secs(5));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}
