//! Time-boxed read cache for list-heavy collections
//!
//! Each service instance fronts its list reads with one of these. Entries
//! expire after the TTL, the map is capped, and any write to the backing
//! collection clears the whole cache.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default time-to-live for cached reads
pub const DEFAULT_TTL: Duration = Duration::from_secs(180);

/// Default cap on cached entries per instance
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// A keyed cache with per-entry TTL and a hard entry cap
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, (Instant, V)>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Look up a fresh entry; expired entries are dropped on access
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(_) => return None,
        };
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a value, evicting the oldest entry when the cache is full
    pub fn put(&self, key: K, value: V) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, (stored_at, _))| *stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(key, (Instant::now(), value));
    }

    /// Wholesale invalidation, called on any write to the collection
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_cached_value() {
        let cache: TtlCache<String, u32> = TtlCache::default();
        cache.put("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_millis(10), 8);
        cache.put("a".to_string(), 1);
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache: TtlCache<String, u32> = TtlCache::default();
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.clear();
        assert_eq!(cache.get(&"a".to_string()), None);
        assert_eq!(cache.get(&"b".to_string()), None);
    }

    #[test]
    fn cap_evicts_oldest_entry() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(60), 2);
        cache.put(1, 10);
        std::thread::sleep(Duration::from_millis(5));
        cache.put(2, 20);
        std::thread::sleep(Duration::from_millis(5));
        cache.put(3, 30);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(20));
        assert_eq!(cache.get(&3), Some(30));
    }
}
