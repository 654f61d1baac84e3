//! Match finder: full-scan fuzzy lookup over a spectrum store.
//!
//! The finder owns one [`SpectrumStore`], one [`MemoCache`] for query keys
//! that were never built, and one [`SpectrumScorer`]. Every query scans the
//! whole store; there is no candidate filtering.
//!
//! # Usage
//!
//! ```
//! use fuzzyspectrum::spectrum::SpectrumFinder;
//! use fuzzyspectrum::algorithms::BlendMode;
//!
//! let mut finder = SpectrumFinder::with_mode(
//!     |s: &String| s.as_str(),
//!     BlendMode::WeightedSimilarityFirst,
//!     0.5,
//! )
//! .unwrap();
//! finder.build(["apple", "orange", "grape"].map(String::from));
//!
//! let best = finder.find_best_match(&"appel".to_string()).unwrap();
//! assert_eq!(best.as_deref(), Some("apple"));
//! ```

use ahash::AHashMap;
use rayon::prelude::*;
use std::hash::Hash;
use tracing::{debug, trace};

use super::cache::MemoCache;
use super::store::SpectrumStore;
use crate::algorithms::blend::{BlendMode, SpectrumScorer};
use crate::algorithms::normalize::normalize_text;
use crate::algorithms::vectorize::{vectorize, Spectrum};
use crate::config::{validate_threshold, FinderConfig, MAX_LENGTH, PARALLEL_THRESHOLD};
use crate::error::{Result, SpectrumError};

/// The operations every query finder supports.
pub trait QueryFinder<K> {
    /// Add items to the corpus. Items already present are skipped.
    fn build<I: IntoIterator<Item = K>>(&mut self, items: I);

    /// Best-scoring corpus item for `query`, regardless of threshold.
    fn find_best_match(&self, query: &K) -> Result<Option<K>>;

    /// Every corpus item scoring at or above the threshold.
    fn find_similar_matches(&self, query: &K) -> AHashMap<K, f32>;
}

/// Full-scan fuzzy matcher over keys of type `K`.
///
/// `F` extracts the text of a key; it must be pure and deterministic.
pub struct SpectrumFinder<K, F> {
    store: SpectrumStore<K>,
    cache: MemoCache<K, Spectrum>,
    scorer: SpectrumScorer,
    threshold: f32,
    extractor: F,
}

/// A finder whose keys are their own text.
pub type StringFinder = SpectrumFinder<String, fn(&String) -> &str>;

impl StringFinder {
    /// Finder over plain strings with the default configuration.
    pub fn for_strings() -> Self {
        Self::new(String::as_str)
    }
}

impl<K, F> SpectrumFinder<K, F>
where
    K: Eq + Hash + Clone,
    F: Fn(&K) -> &str,
{
    /// Create a finder with `SimilarityOnly` blending and a 0.7 threshold.
    pub fn new(extractor: F) -> Self {
        let config = FinderConfig::default();
        Self {
            store: SpectrumStore::new(),
            cache: MemoCache::new(),
            scorer: SpectrumScorer::new(config.mode, config.blend),
            threshold: config.threshold,
            extractor,
        }
    }

    /// Create a finder with the given blend mode and threshold.
    ///
    /// # Errors
    /// `InvalidThreshold` if `threshold` is outside [0.0, 1.0].
    pub fn with_mode(extractor: F, mode: BlendMode, threshold: f32) -> Result<Self> {
        Self::with_config(extractor, FinderConfig::new(mode, threshold))
    }

    /// Create a finder from a full configuration.
    ///
    /// # Errors
    /// Any validation error from [`FinderConfig::validate`].
    pub fn with_config(extractor: F, config: FinderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: SpectrumStore::new(),
            cache: MemoCache::new(),
            scorer: SpectrumScorer::new(config.mode, config.blend),
            threshold: config.threshold,
            extractor,
        })
    }

    #[inline]
    fn text_of<'k>(&self, key: &'k K) -> &'k str {
        (self.extractor)(key)
    }

    /// Vectorize and store every item not already present.
    pub fn build<I: IntoIterator<Item = K>>(&mut self, items: I) {
        let items = items.into_iter();
        self.store.reserve(items.size_hint().0);

        let mut added = 0usize;
        for item in items {
            let text = (self.extractor)(&item);
            let spectrum = vectorize(text);
            if self.store.insert_spectrum(item, spectrum) {
                added += 1;
            }
        }

        debug!(added, total = self.store.len(), "built spectrum store");
    }

    /// Like [`build`](Self::build), but vectorizes large batches in parallel.
    ///
    /// Insertion is still sequential, in input order.
    pub fn build_parallel<I: IntoIterator<Item = K>>(&mut self, items: I)
    where
        K: Send + Sync,
        F: Sync,
    {
        let pending: Vec<K> = items
            .into_iter()
            .filter(|item| !self.store.contains(item))
            .collect();

        if pending.len() < PARALLEL_THRESHOLD {
            self.build(pending);
            return;
        }

        let extractor = &self.extractor;
        let spectra: Vec<(K, Spectrum)> = pending
            .into_par_iter()
            .map(|item| {
                let spectrum = vectorize(extractor(&item));
                (item, spectrum)
            })
            .collect();

        let mut added = 0usize;
        for (item, spectrum) in spectra {
            if self.store.insert_spectrum(item, spectrum) {
                added += 1;
            }
        }

        debug!(added, total = self.store.len(), "built spectrum store in parallel");
    }

    /// Spectrum of any key: from the store if built, else from the side cache.
    pub fn spectrum(&self, key: &K) -> Spectrum {
        match self.store.get(key) {
            Some(spectrum) => *spectrum,
            None => self
                .cache
                .get_or_insert_with(key, |key| vectorize((self.extractor)(key))),
        }
    }

    /// Score stored candidates against a query in insertion order, calling
    /// `visit` with each key and score. Candidates longer than [`MAX_LENGTH`]
    /// are skipped. Reaching the query's own key visits it at 1.0 and ends
    /// the scan.
    ///
    /// Returns the number of candidates visited.
    fn scan<'s, V>(
        &'s self,
        query_key: &K,
        query: &Spectrum,
        query_text: &[char],
        mut visit: V,
    ) -> usize
    where
        V: FnMut(&'s K, f32),
    {
        let mut candidate_text = ['\0'; MAX_LENGTH];
        let mut compared = 0usize;

        for (key, candidate) in self.store.iter() {
            if key == query_key {
                trace!(compared, "exact key match, stopping scan");
                visit(key, 1.0);
                return compared + 1;
            }

            let Ok(written) = normalize_text(self.text_of(key), &mut candidate_text) else {
                trace!("skipping candidate longer than {} chars", MAX_LENGTH);
                continue;
            };

            let score = self
                .scorer
                .score(query, candidate, query_text, &candidate_text[..written]);
            visit(key, score);
            compared += 1;
        }

        compared
    }

    /// Best match together with its score.
    ///
    /// A query key that is already in the store returns itself with score 1.0
    /// without scanning.
    ///
    /// # Errors
    /// `TextTooLong` if the query text exceeds [`MAX_LENGTH`] chars.
    pub fn find_best_match_scored(&self, query: &K) -> Result<Option<(K, f32)>> {
        let text = self.text_of(query);
        let length = text.chars().count();
        if length > MAX_LENGTH {
            return Err(SpectrumError::TextTooLong {
                length,
                max: MAX_LENGTH,
            });
        }

        if self.store.contains(query) {
            trace!("exact key match");
            return Ok(Some((query.clone(), 1.0)));
        }

        let query_spectrum = self.spectrum(query);
        let mut query_text = ['\0'; MAX_LENGTH];
        let written = normalize_text(text, &mut query_text)?;

        let mut best: Option<&K> = None;
        let mut best_score = f32::NEG_INFINITY;
        let compared = self.scan(query, &query_spectrum, &query_text[..written], |key, score| {
            if score > best_score {
                best_score = score;
                best = Some(key);
            }
        });

        debug!(compared, best_score, found = best.is_some(), "find_best_match");
        Ok(best.map(|key| (key.clone(), best_score)))
    }

    /// Best-scoring corpus item for `query`. Does not filter by threshold.
    ///
    /// # Errors
    /// `TextTooLong` if the query text exceeds [`MAX_LENGTH`] chars.
    pub fn find_best_match(&self, query: &K) -> Result<Option<K>> {
        Ok(self.find_best_match_scored(query)?.map(|(key, _)| key))
    }

    /// Every corpus item scoring at or above the configured threshold.
    ///
    /// Candidates are scanned in insertion order. If the query's own key is
    /// stored, it is recorded at 1.0 and the scan stops there, so candidates
    /// inserted after it are not considered. An oversized query yields an
    /// empty map rather than an error.
    pub fn find_similar_matches(&self, query: &K) -> AHashMap<K, f32> {
        self.collect_similar(query, self.threshold)
    }

    /// [`find_similar_matches`](Self::find_similar_matches) with a per-call threshold.
    ///
    /// # Errors
    /// `InvalidThreshold` if `threshold` is not finite or outside [0.0, 1.0].
    pub fn find_similar_matches_with_threshold(
        &self,
        query: &K,
        threshold: f32,
    ) -> Result<AHashMap<K, f32>> {
        validate_threshold(threshold)?;
        Ok(self.collect_similar(query, threshold))
    }

    fn collect_similar(&self, query: &K, threshold: f32) -> AHashMap<K, f32> {
        let mut results = AHashMap::new();

        let text = self.text_of(query);
        let length = text.chars().count();
        if length > MAX_LENGTH {
            debug!(length, "query too long, no matches");
            return results;
        }

        let query_spectrum = self.spectrum(query);
        let mut query_text = ['\0'; MAX_LENGTH];
        let Ok(written) = normalize_text(text, &mut query_text) else {
            return results;
        };

        let compared = self.scan(query, &query_spectrum, &query_text[..written], |key, score| {
            if score >= threshold {
                results.insert(key.clone(), score);
            }
        });

        debug!(compared, matched = results.len(), threshold, "find_similar_matches");
        results
    }

    /// [`find_best_match`](Self::find_best_match) for many queries, in
    /// parallel for large batches. Results are in query order.
    pub fn find_best_matches_batch(&self, queries: &[K]) -> Vec<Result<Option<K>>>
    where
        K: Send + Sync,
        F: Sync,
    {
        if queries.len() >= PARALLEL_THRESHOLD {
            queries
                .par_iter()
                .map(|query| self.find_best_match(query))
                .collect()
        } else {
            queries.iter().map(|query| self.find_best_match(query)).collect()
        }
    }

    /// [`find_similar_matches`](Self::find_similar_matches) for many queries,
    /// in parallel for large batches. Results are in query order.
    pub fn find_similar_matches_batch(&self, queries: &[K]) -> Vec<AHashMap<K, f32>>
    where
        K: Send + Sync,
        F: Sync,
    {
        if queries.len() >= PARALLEL_THRESHOLD {
            queries
                .par_iter()
                .map(|query| self.find_similar_matches(query))
                .collect()
        } else {
            queries
                .iter()
                .map(|query| self.find_similar_matches(query))
                .collect()
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn mode(&self) -> BlendMode {
        self.scorer.mode
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn scorer(&self) -> &SpectrumScorer {
        &self.scorer
    }

    pub fn store(&self) -> &SpectrumStore<K> {
        &self.store
    }

    /// Number of query spectra memoized for keys outside the store.
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }
}

impl<K, F> QueryFinder<K> for SpectrumFinder<K, F>
where
    K: Eq + Hash + Clone,
    F: Fn(&K) -> &str,
{
    fn build<I: IntoIterator<Item = K>>(&mut self, items: I) {
        SpectrumFinder::build(self, items);
    }

    fn find_best_match(&self, query: &K) -> Result<Option<K>> {
        SpectrumFinder::find_best_match(self, query)
    }

    fn find_similar_matches(&self, query: &K) -> AHashMap<K, f32> {
        SpectrumFinder::find_similar_matches(self, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::blend::{BlendConfig, LengthPenalty};

    fn fruit_finder(mode: BlendMode, threshold: f32) -> StringFinder {
        let mut finder = StringFinder::with_mode(String::as_str, mode, threshold).unwrap();
        finder.build(["apple", "orange", "grape"].map(String::from));
        finder
    }

    #[test]
    fn test_best_match_transposed() {
        let finder = fruit_finder(BlendMode::WeightedSimilarityFirst, 0.5);
        let best = finder.find_best_match(&"appel".to_string()).unwrap();
        assert_eq!(best.as_deref(), Some("apple"));
    }

    #[test]
    fn test_best_match_every_mode() {
        for mode in BlendMode::ALL {
            let finder = fruit_finder(mode, 0.5);
            let best = finder.find_best_match(&"appel".to_string()).unwrap();
            assert_eq!(best.as_deref(), Some("apple"), "mode {}", mode);
        }
    }

    #[test]
    fn test_exact_key_short_circuits() {
        let finder = fruit_finder(BlendMode::MinScore, 0.9);
        let query = "grape".to_string();
        assert_eq!(
            finder.find_best_match_scored(&query).unwrap(),
            Some((query.clone(), 1.0))
        );

        // apple (about 0.95) is scanned before grape, orange (about 0.69) is
        // below the threshold
        let similar = finder.find_similar_matches(&query);
        assert_eq!(similar.len(), 2);
        assert_eq!(similar.get(&query), Some(&1.0));
        assert!(similar.contains_key("apple"));
        // Exact matches never touch the side cache
        assert_eq!(finder.cached_queries(), 0);
    }

    #[test]
    fn test_exact_key_stops_scan() {
        let mut finder =
            StringFinder::with_mode(String::as_str, BlendMode::SimilarityOnly, 0.5).unwrap();
        finder.build(["grapes", "grape", "apple"].map(String::from));

        let similar = finder.find_similar_matches(&"grape".to_string());
        // grapes comes first and scores about 0.75
        assert!(similar.contains_key("grapes"));
        assert_eq!(similar.get("grape"), Some(&1.0));
        // apple would score about 0.998 but sits after the exact key
        assert!(!similar.contains_key("apple"));
        assert_eq!(similar.len(), 2);
    }

    #[test]
    fn test_threshold_override_validated() {
        let finder = fruit_finder(BlendMode::SimilarityOnly, 0.5);
        let query = "appel".to_string();
        assert_eq!(
            finder.find_similar_matches_with_threshold(&query, 1.5),
            Err(SpectrumError::InvalidThreshold(1.5))
        );
        assert!(finder
            .find_similar_matches_with_threshold(&query, f32::NAN)
            .is_err());
        assert!(finder
            .find_similar_matches_with_threshold(&query, -0.1)
            .is_err());
        assert!(finder.find_similar_matches_with_threshold(&query, 1.0).is_ok());
    }

    #[test]
    fn test_empty_store() {
        let finder = StringFinder::for_strings();
        assert_eq!(finder.find_best_match(&"anything".to_string()), Ok(None));
        assert!(finder.find_similar_matches(&"anything".to_string()).is_empty());
    }

    #[test]
    fn test_best_match_ignores_threshold() {
        let finder = fruit_finder(BlendMode::SimilarityOnly, 1.0);
        let (key, score) = finder
            .find_best_match_scored(&"zzzzzzzzzzzz".to_string())
            .unwrap()
            .unwrap();
        assert!(score < 1.0);
        assert!(["apple", "orange", "grape"].contains(&key.as_str()));
    }

    #[test]
    fn test_ties_keep_first_seen() {
        // Both keys extract the same text, so they score identically
        let mut finder = SpectrumFinder::new(|s: &String| &s[..3]);
        finder.build(vec!["abcX".to_string(), "abcY".to_string()]);
        let best = finder.find_best_match(&"abd".to_string()).unwrap();
        assert_eq!(best.as_deref(), Some("abcX"));
    }

    #[test]
    fn test_oversized_query() {
        let finder = fruit_finder(BlendMode::SimilarityOnly, 0.5);
        let query = "a".repeat(300);
        assert_eq!(
            finder.find_best_match(&query),
            Err(SpectrumError::TextTooLong {
                length: 300,
                max: MAX_LENGTH
            })
        );
        assert!(finder.find_similar_matches(&query).is_empty());
    }

    #[test]
    fn test_max_length_query_accepted() {
        let finder = fruit_finder(BlendMode::SimilarityOnly, 0.5);
        let query = "a".repeat(MAX_LENGTH);
        assert!(finder.find_best_match(&query).unwrap().is_some());
    }

    #[test]
    fn test_oversized_candidates_skipped() {
        let mut finder = StringFinder::for_strings();
        finder.build(vec!["b".repeat(400), "bell".to_string()]);
        let similar = finder
            .find_similar_matches_with_threshold(&"ball".to_string(), 0.0)
            .unwrap();
        assert_eq!(similar.len(), 1);
        assert!(similar.contains_key("bell"));

        let mut only_long = StringFinder::for_strings();
        only_long.build(vec!["c".repeat(257)]);
        assert_eq!(only_long.find_best_match(&"c".to_string()), Ok(None));
    }

    #[test]
    fn test_threshold_override() {
        let finder = fruit_finder(BlendMode::WeightedSimilarityFirst, 0.5);
        let query = "appel".to_string();
        assert_eq!(
            finder
                .find_similar_matches_with_threshold(&query, 0.0)
                .unwrap()
                .len(),
            3
        );
        let strict = finder
            .find_similar_matches_with_threshold(&query, 0.98)
            .unwrap();
        assert_eq!(strict.keys().collect::<Vec<_>>(), vec!["apple"]);
    }

    #[test]
    fn test_query_spectrum_memoized() {
        let finder = fruit_finder(BlendMode::SimilarityOnly, 0.5);
        let query = "grap".to_string();
        finder.find_best_match(&query).unwrap();
        finder.find_similar_matches(&query);
        assert_eq!(finder.cached_queries(), 1);
        assert_eq!(finder.spectrum(&query), vectorize("grap"));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut finder = fruit_finder(BlendMode::SimilarityOnly, 0.5);
        finder.build(["apple", "kiwi"].map(String::from));
        assert_eq!(finder.len(), 4);
        assert!(finder.contains(&"kiwi".to_string()));
    }

    #[test]
    fn test_build_parallel() {
        let words: Vec<String> = (0..250).map(|i| format!("word{}", i)).collect();
        let mut finder = StringFinder::for_strings();
        finder.build_parallel(words.clone());
        finder.build_parallel(words.clone());
        assert_eq!(finder.len(), 250);
        let keys: Vec<&String> = finder.store().keys().collect();
        assert_eq!(keys[0], "word0");
        assert_eq!(keys[249], "word249");
    }

    #[test]
    fn test_batch_queries_match_single() {
        let words: Vec<String> = (0..50).map(|i| format!("item{:03}", i)).collect();
        let mut finder = StringFinder::for_strings();
        finder.build(words);

        let queries: Vec<String> = (0..120).map(|i| format!("itme{:03}", i % 50)).collect();
        let batch = finder.find_best_matches_batch(&queries);
        assert_eq!(batch.len(), queries.len());
        for (query, result) in queries.iter().zip(&batch) {
            assert_eq!(result, &finder.find_best_match(query));
        }

        let similar = finder.find_similar_matches_batch(&queries[..3]);
        assert_eq!(similar.len(), 3);
        let single = finder.find_similar_matches(&queries[0]);
        assert_eq!(similar[0].len(), single.len());
        for (key, score) in single.iter() {
            assert_eq!(similar[0].get(key), Some(score));
        }
    }

    #[test]
    fn test_custom_keys() {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        struct Product {
            sku: u32,
            name: String,
        }

        let mut finder = SpectrumFinder::new(|p: &Product| p.name.as_str());
        finder.build(vec![
            Product { sku: 1, name: "keyboard".into() },
            Product { sku: 2, name: "monitor".into() },
        ]);
        let query = Product { sku: 0, name: "keybaord".into() };
        let best = finder.find_best_match(&query).unwrap().unwrap();
        assert_eq!(best.sku, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(StringFinder::with_mode(String::as_str, BlendMode::MaxScore, -0.1).is_err());
        let config = FinderConfig::new(BlendMode::TypoBlend, 0.5)
            .with_blend(BlendConfig::default().with_weights(0.9, 0.9));
        assert!(StringFinder::with_config(String::as_str, config).is_err());
    }

    #[test]
    fn test_log_penalty_config() {
        let config = FinderConfig::new(BlendMode::SimilarityOnly, 0.0).with_blend(
            BlendConfig::default().with_length_penalty(Some(LengthPenalty::Logarithmic)),
        );
        let mut finder = StringFinder::with_config(String::as_str, config).unwrap();
        finder.build(vec!["ab".to_string()]);
        let score = finder.find_similar_matches(&"abcdef".to_string())["ab"];
        let raw = crate::algorithms::cosine_similarity(&vectorize("abcdef"), &vectorize("ab"));
        let expected = raw * (3.0f32.log2() / 7.0f32.log2());
        assert!((score - expected).abs() < 1e-5);
    }

    #[test]
    fn test_trait_object_usage() {
        fn run<Q: QueryFinder<String>>(finder: &mut Q) -> Option<String> {
            finder.build(vec!["hello".to_string(), "world".to_string()]);
            finder.find_best_match(&"wrold".to_string()).unwrap()
        }
        let mut finder = StringFinder::for_strings();
        assert_eq!(run(&mut finder).as_deref(), Some("world"));
        assert_eq!(finder.mode(), BlendMode::SimilarityOnly);
        assert_eq!(finder.threshold(), 0.7);
    }
}
