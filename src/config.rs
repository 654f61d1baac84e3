//! Constants and finder configuration.

use serde::{Deserialize, Serialize};

use crate::algorithms::blend::{BlendConfig, BlendMode};
use crate::error::{Result, SpectrumError};

/// Highest char code with its own weight in the encoding table.
pub const MAX_CHAR_CODE: u32 = 127;

/// Number of slots in a spectrum vector.
pub const VECTOR_SIZE: usize = MAX_CHAR_CODE as usize + 1;

/// Longest text (in chars) the finder will compare.
pub const MAX_LENGTH: usize = 256;

/// Weight written for chars outside the encoding table.
pub const UNMAPPED_WEIGHT: f32 = 1.0;

/// Default size of character n-grams used by the typo detector.
pub const DEFAULT_NGRAM_SIZE: usize = 2;

/// Typo scores below this do not contribute to a `TypoBlend` score.
pub const DEFAULT_TYPO_THRESHOLD: f32 = 0.5;

/// Default minimum score for `find_similar_matches`.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Default weight of the cosine term in weighted blends.
pub const DEFAULT_SIMILARITY_WEIGHT: f32 = 0.6;

/// Default weight of the typo term in `TypoBlend`.
pub const DEFAULT_TYPO_WEIGHT: f32 = 0.3;

/// Minimum batch size for parallel processing.
///
/// Below this, rayon's coordination overhead outweighs the per-item work.
pub const PARALLEL_THRESHOLD: usize = 100;

/// Validate that a threshold or score is finite and in [0.0, 1.0]
pub(crate) fn validate_threshold(value: f32) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SpectrumError::InvalidThreshold(value));
    }
    Ok(())
}

/// Configuration for a [`SpectrumFinder`](crate::spectrum::SpectrumFinder).
///
/// The blend mode and threshold are fixed for the lifetime of a finder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Strategy used to combine the base metrics
    pub mode: BlendMode,
    /// Minimum score kept by `find_similar_matches`
    pub threshold: f32,
    /// Weights and penalty settings for the blend
    pub blend: BlendConfig,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            mode: BlendMode::default(),
            threshold: DEFAULT_THRESHOLD,
            blend: BlendConfig::default(),
        }
    }
}

impl FinderConfig {
    #[must_use]
    pub fn new(mode: BlendMode, threshold: f32) -> Self {
        Self {
            mode,
            threshold,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_blend(mut self, blend: BlendConfig) -> Self {
        self.blend = blend;
        self
    }

    /// Check the threshold and every blend parameter.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        self.blend.validate()
    }
}
