//! Concurrent memoizing cache.
//!
//! Backs the finder's fallback path for query keys that were never built
//! into the store. Uses `parking_lot::RwLock` so concurrent queries can read
//! in parallel.
//!
//! # Concurrency
//!
//! - Lookups take a shared read lock
//! - A miss computes the value with no lock held, then takes the write lock
//!   to insert it; if another thread inserted first, its value wins and the
//!   local one is dropped
//! - Values are returned by clone, so callers never observe a slot that is
//!   still being written

use ahash::AHashMap;
use parking_lot::RwLock;
use std::hash::Hash;

/// Memoize-on-miss cache with no eviction.
#[derive(Debug)]
pub struct MemoCache<K, V> {
    inner: RwLock<AHashMap<K, V>>,
}

impl<K, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(AHashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> MemoCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `factory` on a miss.
    ///
    /// Two threads missing on the same key may both run `factory`; only the
    /// first insert is kept.
    pub fn get_or_insert_with<F>(&self, key: &K, factory: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(value) = self.inner.read().get(key) {
            return value.clone();
        }

        let value = factory(key);
        self.inner
            .write()
            .entry(key.clone())
            .or_insert(value)
            .clone()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.read().get(key).cloned()
    }

    /// Insert or overwrite a value.
    pub fn insert(&self, key: K, value: V) {
        self.inner.write().insert(key, value);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}
