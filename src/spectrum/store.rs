//! Spectrum store: the corpus of precomputed vectors.
//!
//! Each key is vectorized once, on first insertion. Entries are kept in
//! insertion order so scans are deterministic, with a hash lookup beside them
//! for O(1) `get`/`contains`. Nothing is ever removed.

use ahash::AHashMap;
use std::hash::Hash;

use crate::algorithms::vectorize::{vectorize, Spectrum};

/// Key → spectrum mapping, built once and read many times.
#[derive(Debug, Clone)]
pub struct SpectrumStore<K> {
    /// Entries in first-insertion order
    entries: Vec<(K, Spectrum)>,
    /// Map from key to its position in `entries`
    lookup: AHashMap<K, usize>,
}

impl<K> Default for SpectrumStore<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            lookup: AHashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> SpectrumStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            lookup: AHashMap::with_capacity(capacity),
        }
    }

    /// Vectorize `text` and store it under `key`.
    ///
    /// Returns false (and does no work) if the key is already present.
    pub fn insert(&mut self, key: K, text: &str) -> bool {
        if self.lookup.contains_key(&key) {
            return false;
        }
        self.push(key, vectorize(text));
        true
    }

    /// Store a precomputed spectrum. Returns false if the key is already present.
    pub fn insert_spectrum(&mut self, key: K, spectrum: Spectrum) -> bool {
        if self.lookup.contains_key(&key) {
            return false;
        }
        self.push(key, spectrum);
        true
    }

    fn push(&mut self, key: K, spectrum: Spectrum) {
        self.lookup.insert(key.clone(), self.entries.len());
        self.entries.push((key, spectrum));
    }

    /// Reserve space for `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
        self.lookup.reserve(additional);
    }

    pub fn get(&self, key: &K) -> Option<&Spectrum> {
        self.lookup.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lookup.contains_key(key)
    }

    /// Every `(slot, weight)` of a key's spectrum; empty for unknown keys.
    pub fn frequencies<'a>(&'a self, key: &K) -> impl Iterator<Item = (usize, f32)> + 'a {
        self.get(key)
            .into_iter()
            .flat_map(|spectrum| spectrum.iter().copied().enumerate())
    }

    /// Only the non-zero `(slot, weight)` pairs of a key's spectrum.
    pub fn non_zero_frequencies<'a>(
        &'a self,
        key: &K,
    ) -> impl Iterator<Item = (usize, f32)> + 'a {
        self.frequencies(key).filter(|&(_, weight)| weight != 0.0)
    }
}

impl<K> SpectrumStore<K> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// `(key, spectrum)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Spectrum)> {
        self.entries.iter().map(|(key, spectrum)| (key, spectrum))
    }
}
