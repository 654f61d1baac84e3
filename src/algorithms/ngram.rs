//! N-gram typo detection
//!
//! Approximates the Jaccard similarity of two texts' n-gram multisets.
//! Each n-gram is reduced to a polynomial hash (seed 17, base 31) and the
//! intersection is counted by greedily pairing every query hash with the
//! first unconsumed equal candidate hash. Distinct n-grams that collide on
//! the hash are counted as equal.
//!
//! # Complexity
//! - Time: O(m·n) for the greedy pairing
//! - Space: O(m+n) hashes, held inline for any text up to `MAX_LENGTH` chars

use smallvec::SmallVec;

use super::normalize::substitute;
use super::Similarity;
use crate::config::{DEFAULT_NGRAM_SIZE, MAX_LENGTH};

const HASH_SEED: u32 = 17;
const HASH_BASE: u32 = 31;

/// Inline capacity for n-gram hash buffers. Every text the finder scans fits,
/// so scoring a candidate never allocates.
pub const INLINE_NGRAMS: usize = MAX_LENGTH;

pub type HashBuffer = SmallVec<[u32; INLINE_NGRAMS]>;

/// Number of overlapping n-grams in a text of `length` chars.
/// Returns 0 for `n == 0`.
#[inline]
#[must_use]
pub fn ngram_count(length: usize, n: usize) -> usize {
    if n == 0 {
        0
    } else {
        (length + 1).saturating_sub(n)
    }
}

/// Polynomial rolling hash of one n-gram.
#[inline]
#[must_use]
pub fn hash_ngram(ngram: &[char]) -> u32 {
    ngram.iter().fold(HASH_SEED, |hash, &c| {
        hash.wrapping_mul(HASH_BASE).wrapping_add(c as u32)
    })
}

/// Hash every overlapping n-gram of `text`, in order.
#[must_use]
pub fn extract_ngram_hashes(text: &[char], n: usize) -> HashBuffer {
    if ngram_count(text.len(), n) == 0 {
        return SmallVec::new();
    }
    text.windows(n).map(hash_ngram).collect()
}

/// Approximate Jaccard similarity of two (already normalized) texts.
///
/// Returns 0.0 when either text yields no n-grams.
#[must_use]
pub fn jaccard_ngram_similarity(query: &[char], candidate: &[char], n: usize) -> f32 {
    let query_hashes: HashBuffer = extract_ngram_hashes(query, n);
    let candidate_hashes: HashBuffer = extract_ngram_hashes(candidate, n);

    if query_hashes.is_empty() || candidate_hashes.is_empty() {
        return 0.0;
    }

    let mut consumed: SmallVec<[bool; INLINE_NGRAMS]> =
        smallvec::smallvec![false; candidate_hashes.len()];
    let mut intersection = 0usize;

    for &hash in &query_hashes {
        let matched = candidate_hashes
            .iter()
            .zip(consumed.iter_mut())
            .find(|(candidate, used)| !**used && **candidate == hash);
        if let Some((_, used)) = matched {
            *used = true;
            intersection += 1;
        }
    }

    let union = query_hashes.len() + candidate_hashes.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Typo detector over raw strings.
///
/// Normalizes look-alike characters on both sides before comparing n-grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypoDetector {
    /// Size of each n-gram
    pub ngram_size: usize,
}

impl Default for TypoDetector {
    fn default() -> Self {
        Self {
            ngram_size: DEFAULT_NGRAM_SIZE,
        }
    }
}

impl TypoDetector {
    #[must_use]
    pub fn new(ngram_size: usize) -> Self {
        Self { ngram_size }
    }

    /// Compare two already normalized texts.
    #[inline]
    #[must_use]
    pub fn score(&self, query: &[char], candidate: &[char]) -> f32 {
        jaccard_ngram_similarity(query, candidate, self.ngram_size)
    }
}

impl Similarity for TypoDetector {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().map(substitute).collect();
        let b: Vec<char> = b.chars().map(substitute).collect();
        f64::from(self.score(&a, &b))
    }

    fn name(&self) -> &'static str {
        "typo_ngram"
    }
}
