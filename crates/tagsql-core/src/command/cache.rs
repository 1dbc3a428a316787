//! Memoizing map shared by the clause, command and statement caches.

use parking_lot::RwLock;
use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing::{debug, trace};

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

///
/// Cache
///
/// Entries are built outside the lock and inserted under the write lock.
/// Two callers missing on the same key may both build; the last insert
/// is retained and both values are equivalent.
///

#[derive(Debug)]
pub struct Cache<K, V> {
    name: &'static str,
    entries: RwLock<HashMap<K, Arc<V>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<K, V> Cache<K, V>
where
    K: Debug + Eq + Hash,
{
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.read().get(key).cloned()
    }

    /// Return the entry for `key`, building it with `build` on a miss.
    ///
    /// A failed build leaves the cache untouched.
    pub fn get_or_build<E>(&self, key: K, build: impl FnOnce() -> Result<V, E>) -> Result<Arc<V>, E> {
        if let Some(hit) = self.get(&key) {
            // stats are best-effort only
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(cache = self.name, ?key, "cache hit");

            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(build()?);
        debug!(cache = self.name, ?key, "cache miss, entry built");

        self.entries.write().insert(key, Arc::clone(&value));

        Ok(value)
    }

    /// Store `value` under `key` unconditionally.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.write().insert(key, Arc::clone(&value));

        value
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.len(),
        }
    }
}
