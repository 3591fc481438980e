//! Result storage for memoized computations.
//!
//! A memoizer must never serve a result computed for a different argument
//! sequence, so the store keeps full keys and resolves lookups by equality,
//! never by a lossy hash slot. Entries are only ever added: there is no
//! eviction, no expiry and no size bound.
//!
//! # Default
//!
//! The type alias [`Cache`] points to [`HashMapCache`].
//!
//! # Example
//!
//! ```
//! use memo_rs::cache::Cache;
//!
//! let mut cache = Cache::<(u64, u64), i32>::new(4);
//! cache.insert((1, 2), 42);
//! assert_eq!(cache.get(&(1, 2)), Some(&42));
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::fmt::{Display, Formatter};

mod hashmap;

pub use hashmap::HashMapCache;

/// Default cache implementation.
pub type Cache<K, V> = HashMapCache<K, V>;

/// Snapshot of cache counters.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: usize,
    /// Lookups that found nothing, i.e. computations started.
    pub misses: usize,
    /// Stored results.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, `0.0` if there were none.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl Display for CacheStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits = {}, misses = {}, entries = {}, hit rate = {:.1}%",
            self.hits,
            self.misses,
            self.entries,
            self.hit_rate() * 100.0
        )
    }
}
