//! Core scoring algorithms
//!
//! Each stage of the pipeline is a standalone function for composability:
//! normalize, vectorize, the two base metrics, the typo detector, and the
//! blend that combines them. String-level scorers also implement the
//! [`Similarity`] trait.

pub mod blend;
pub mod cosine;
pub mod ngram;
pub mod normalize;
pub mod transposition;
pub mod vectorize;

pub use blend::*;
pub use cosine::*;
pub use ngram::*;
pub use normalize::*;
pub use transposition::*;
pub use vectorize::*;

/// Trait for string similarity scorers.
/// Returns a value between 0.0 (completely different) and 1.0 (identical).
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Convenience method for distance (1.0 - similarity)
    fn distance(&self, a: &str, b: &str) -> f64 {
        1.0 - self.similarity(a, b)
    }

    /// Name of the algorithm for debugging/logging
    fn name(&self) -> &'static str;
}
