//! Bounded lookup caches for the class resolver.
//!
//! Reads never touch recency, so eviction follows insertion order: the entry
//! inserted (or re-inserted) longest ago goes first.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Entries kept per cache unless configured otherwise
pub const DEFAULT_CAPACITY: usize = 512;

/// Fixed-size map that evicts its oldest insertion
#[derive(Debug)]
pub struct BoundedCache<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Create a cache; a zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Cached value for `key`. `Some(&None)` is a cached negative result.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.peek(key)
    }

    /// Insert or refresh an entry, returning the evicted entry if any
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.entries.push(key, value)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_evicts_oldest_insertion() {
        let mut cache = BoundedCache::new(3);
        for key in ["a", "b", "c"] {
            assert!(cache.insert(key, key.len()).is_none());
        }
        let evicted = cache.insert("d", 1);

        assert_eq!(evicted, Some(("a", 1)));
        assert!(cache.get(&"a").is_none());
        for key in ["b", "c", "d"] {
            assert!(cache.get(&key).is_some());
        }
    }

    #[test]
    fn test_reads_do_not_refresh() {
        let mut cache = BoundedCache::new(2);
        cache.insert(1, "one");
        cache.insert(2, "two");
        assert_eq!(cache.get(&1), Some(&"one"));

        cache.insert(3, "three");
        assert!(cache.get(&1).is_none());
        assert!(cache.get(&2).is_some());
    }

    #[test]
    fn test_reinsert_marks_fresh() {
        let mut cache = BoundedCache::new(2);
        cache.insert(1, "one");
        cache.insert(2, "two");
        cache.insert(1, "uno");
        cache.insert(3, "three");

        assert_eq!(cache.get(&1), Some(&"uno"));
        assert!(cache.get(&2).is_none());
    }

    #[test]
    fn test_negative_results_are_distinct_from_misses() {
        let mut cache: BoundedCache<&str, Option<String>> = BoundedCache::new(4);
        cache.insert("resolved-none", None);

        assert_eq!(cache.get(&"resolved-none"), Some(&None));
        assert_eq!(cache.get(&"never-seen"), None);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut cache = BoundedCache::new(0);
        assert!(cache.insert("a", 1).is_none());
        assert_eq!(cache.insert("b", 2), Some(("a", 1)));
        assert_eq!(cache.get(&"b"), Some(&2));
    }
}
