//! FuzzySpectrum - character-spectrum fuzzy string matching
//!
//! Strings are normalized (look-alike digits and symbols become letters),
//! mapped to a fixed 128-slot positional spectrum, and compared with a blend
//! of cosine similarity, a transposition score and an n-gram typo detector.
//!
//! # Features
//! - Precomputed spectrum store with O(1) key lookup
//! - Eight blend modes with configurable weights and length penalty
//! - Memoized query spectra behind a concurrent cache
//! - Parallel corpus build and batch queries (rayon)
//! - Optional Python bindings (`python` feature)
//!
//! # Example
//!
//! ```
//! use fuzzyspectrum::{BlendMode, StringFinder};
//!
//! let mut finder = StringFinder::for_strings();
//! finder.build(["apple", "orange", "grape"].map(String::from));
//!
//! let best = finder.find_best_match(&"appel".to_string()).unwrap();
//! assert_eq!(best.as_deref(), Some("apple"));
//! assert_eq!(finder.mode(), BlendMode::SimilarityOnly);
//! ```

pub mod algorithms;
pub mod config;
pub mod error;
pub mod spectrum;

#[cfg(feature = "python")]
mod python;

pub use algorithms::{
    BlendConfig, BlendMode, LengthPenalty, Similarity, Spectrum, SpectrumScorer, TypoDetector,
};
pub use config::{FinderConfig, MAX_LENGTH, VECTOR_SIZE};
pub use error::{Result, SpectrumError};
pub use spectrum::{MemoCache, QueryFinder, SpectrumFinder, SpectrumStore, StringFinder};
