//! Score blending
//!
//! Combines the cosine similarity and transposition score of two spectra
//! into one final score, optionally mixing in the n-gram typo score, then
//! discounts pairs of very different lengths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cosine::cosine_similarity;
use super::ngram::{jaccard_ngram_similarity, TypoDetector};
use super::normalize::substitute;
use super::transposition::spectrum_transposition;
use super::vectorize::{vectorize, Spectrum};
use super::Similarity;
use crate::config::{
    validate_threshold, DEFAULT_NGRAM_SIZE, DEFAULT_SIMILARITY_WEIGHT, DEFAULT_TYPO_THRESHOLD,
    DEFAULT_TYPO_WEIGHT,
};
use crate::error::{Result, SpectrumError};

/// Strategy for combining similarity (`s`) and transposition (`t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// `s`
    #[default]
    SimilarityOnly,
    /// `t`
    TranspositionOnly,
    /// `(s + t) / 2`
    CombinedAverage,
    /// `s·w + t·(1 − w)`
    WeightedSimilarityFirst,
    /// `s² · (1 − |s − t|)`
    NonLinearBlend,
    /// `max(s, t)`
    MaxScore,
    /// `min(s, t)`
    MinScore,
    /// `s·w + t·(1 − w − tw) + typo·tw`
    TypoBlend,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 8] = [
        BlendMode::SimilarityOnly,
        BlendMode::TranspositionOnly,
        BlendMode::CombinedAverage,
        BlendMode::WeightedSimilarityFirst,
        BlendMode::NonLinearBlend,
        BlendMode::MaxScore,
        BlendMode::MinScore,
        BlendMode::TypoBlend,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::SimilarityOnly => "similarity_only",
            BlendMode::TranspositionOnly => "transposition_only",
            BlendMode::CombinedAverage => "combined_average",
            BlendMode::WeightedSimilarityFirst => "weighted_similarity_first",
            BlendMode::NonLinearBlend => "non_linear_blend",
            BlendMode::MaxScore => "max_score",
            BlendMode::MinScore => "min_score",
            BlendMode::TypoBlend => "typo_blend",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = SpectrumError;

    /// Parse a mode name. Accepts snake_case, kebab-case and the bare
    /// `"similarity"`/`"transposition"`/`"average"`/`"weighted"`/`"max"`/
    /// `"min"`/`"typo"` shorthands, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "similarity_only" | "similarity" => Ok(BlendMode::SimilarityOnly),
            "transposition_only" | "transposition" => Ok(BlendMode::TranspositionOnly),
            "combined_average" | "average" => Ok(BlendMode::CombinedAverage),
            "weighted_similarity_first" | "weighted" => Ok(BlendMode::WeightedSimilarityFirst),
            "non_linear_blend" | "nonlinear_blend" | "non_linear" => Ok(BlendMode::NonLinearBlend),
            "max_score" | "max" => Ok(BlendMode::MaxScore),
            "min_score" | "min" => Ok(BlendMode::MinScore),
            "typo_blend" | "typo" => Ok(BlendMode::TypoBlend),
            _ => Err(SpectrumError::UnknownBlendMode(s.to_string())),
        }
    }
}

/// Length ratio used to discount pairs of different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPenalty {
    /// `min / max`
    #[default]
    Linear,
    /// `log2(1 + min) / log2(1 + max)`
    Logarithmic,
}

impl LengthPenalty {
    /// Ratio for two non-zero lengths.
    #[inline]
    #[must_use]
    pub fn ratio(&self, a: usize, b: usize) -> f32 {
        let min = a.min(b) as f32;
        let max = a.max(b) as f32;
        match self {
            LengthPenalty::Linear => min / max,
            LengthPenalty::Logarithmic => (1.0 + min).log2() / (1.0 + max).log2(),
        }
    }
}

/// Tunables of the blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Weight `w` of the cosine term in weighted blends
    pub similarity_weight: f32,
    /// Weight `tw` of the typo term in `TypoBlend`
    pub typo_weight: f32,
    /// N-gram size used by the typo detector
    pub ngram_size: usize,
    /// Typo scores below this drop the typo term entirely
    pub typo_threshold: f32,
    /// Length discount; `None` disables it
    pub length_penalty: Option<LengthPenalty>,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            similarity_weight: DEFAULT_SIMILARITY_WEIGHT,
            typo_weight: DEFAULT_TYPO_WEIGHT,
            ngram_size: DEFAULT_NGRAM_SIZE,
            typo_threshold: DEFAULT_TYPO_THRESHOLD,
            length_penalty: Some(LengthPenalty::Linear),
        }
    }
}

impl BlendConfig {
    #[must_use]
    pub fn with_length_penalty(mut self, penalty: Option<LengthPenalty>) -> Self {
        self.length_penalty = penalty;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, similarity_weight: f32, typo_weight: f32) -> Self {
        self.similarity_weight = similarity_weight;
        self.typo_weight = typo_weight;
        self
    }

    /// Check weights, threshold and n-gram size.
    pub fn validate(&self) -> Result<()> {
        check_weight("similarity_weight", self.similarity_weight)?;
        check_weight("typo_weight", self.typo_weight)?;
        check_weight(
            "similarity_weight + typo_weight",
            self.similarity_weight + self.typo_weight,
        )?;
        validate_threshold(self.typo_threshold)?;
        if self.ngram_size == 0 {
            return Err(SpectrumError::InvalidNgramSize(self.ngram_size));
        }
        Ok(())
    }
}

fn check_weight(name: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SpectrumError::InvalidWeight { name, value });
    }
    Ok(())
}

/// Apply the length discount.
///
/// An empty text on either side forces the score to 0.0.
#[inline]
#[must_use]
pub fn apply_length_penalty(
    score: f32,
    query_len: usize,
    candidate_len: usize,
    penalty: LengthPenalty,
) -> f32 {
    if query_len == 0 || candidate_len == 0 {
        return 0.0;
    }
    score * penalty.ratio(query_len, candidate_len)
}

/// Blend the two base metrics for a pair of normalized texts.
#[must_use]
pub fn blend_scores(
    similarity: f32,
    transposition: f32,
    query_text: &[char],
    candidate_text: &[char],
    mode: BlendMode,
    config: &BlendConfig,
) -> f32 {
    let w = config.similarity_weight;

    let blended = match mode {
        BlendMode::SimilarityOnly => similarity,
        BlendMode::TranspositionOnly => transposition,
        BlendMode::CombinedAverage => (similarity + transposition) / 2.0,
        BlendMode::WeightedSimilarityFirst => similarity * w + transposition * (1.0 - w),
        BlendMode::NonLinearBlend => {
            similarity * similarity * (1.0 - (similarity - transposition).abs())
        }
        BlendMode::MaxScore => similarity.max(transposition),
        BlendMode::MinScore => similarity.min(transposition),
        BlendMode::TypoBlend => {
            let typo = jaccard_ngram_similarity(query_text, candidate_text, config.ngram_size);
            let tw = if typo < config.typo_threshold {
                0.0
            } else {
                config.typo_weight
            };
            similarity * w + transposition * (1.0 - w - tw) + typo * tw
        }
    };

    match config.length_penalty {
        Some(penalty) => {
            apply_length_penalty(blended, query_text.len(), candidate_text.len(), penalty)
        }
        None => blended,
    }
}

/// The full per-candidate scoring step: both metrics, then the blend.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectrumScorer {
    pub mode: BlendMode,
    pub config: BlendConfig,
}

impl SpectrumScorer {
    #[must_use]
    pub fn new(mode: BlendMode, config: BlendConfig) -> Self {
        Self { mode, config }
    }

    /// Score a candidate against a query.
    ///
    /// Spectra come from the raw texts, the char slices are the normalized
    /// texts.
    #[inline]
    #[must_use]
    pub fn score(
        &self,
        query: &Spectrum,
        candidate: &Spectrum,
        query_text: &[char],
        candidate_text: &[char],
    ) -> f32 {
        let similarity = cosine_similarity(query, candidate);
        let transposition = spectrum_transposition(query, candidate);
        blend_scores(
            similarity,
            transposition,
            query_text,
            candidate_text,
            self.mode,
            &self.config,
        )
    }

    /// Typo detector configured like this scorer.
    #[must_use]
    pub fn typo_detector(&self) -> TypoDetector {
        TypoDetector::new(self.config.ngram_size)
    }
}

impl Similarity for SpectrumScorer {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a_text: Vec<char> = a.chars().map(substitute).collect();
        let b_text: Vec<char> = b.chars().map(substitute).collect();
        f64::from(self.score(&vectorize(a), &vectorize(b), &a_text, &b_text))
    }

    fn name(&self) -> &'static str {
        self.mode.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn no_penalty() -> BlendConfig {
        BlendConfig::default().with_length_penalty(None)
    }

    #[test]
    fn test_simple_modes() {
        let t = chars("same");
        let config = no_penalty();
        let blend = |mode| blend_scores(0.8, 0.4, &t, &t, mode, &config);

        assert_eq!(blend(BlendMode::SimilarityOnly), 0.8);
        assert_eq!(blend(BlendMode::TranspositionOnly), 0.4);
        assert!(approx_eq(blend(BlendMode::WeightedSimilarityFirst), 0.8 * 0.6 + 0.4 * 0.4));
        assert!(approx_eq(blend(BlendMode::NonLinearBlend), 0.64 * 0.6));
        assert_eq!(blend(BlendMode::MaxScore), 0.8);
        assert_eq!(blend(BlendMode::MinScore), 0.4);
    }

    #[test]
    fn test_combined_average_exact() {
        let t = chars("text");
        let config = no_penalty();
        for (s, tr) in [(0.1f32, 0.9f32), (0.33, 0.77), (1.0, 0.0), (0.5, 0.5)] {
            assert_eq!(
                blend_scores(s, tr, &t, &t, BlendMode::CombinedAverage, &config),
                (s + tr) / 2.0
            );
        }
    }

    #[test]
    fn test_typo_blend_above_threshold() {
        // color/colour typo score is exactly 0.5, which meets the threshold
        let config = no_penalty();
        let score = blend_scores(
            0.8,
            0.4,
            &chars("color"),
            &chars("colour"),
            BlendMode::TypoBlend,
            &config,
        );
        let expected = 0.8 * 0.6 + 0.4 * (1.0 - 0.6 - 0.3) + 0.5 * 0.3;
        assert!(approx_eq(score, expected));
    }

    #[test]
    fn test_typo_blend_below_threshold_drops_typo_weight() {
        let config = no_penalty();
        let score = blend_scores(
            0.8,
            0.4,
            &chars("abc"),
            &chars("xyz"),
            BlendMode::TypoBlend,
            &config,
        );
        let weighted = blend_scores(
            0.8,
            0.4,
            &chars("abc"),
            &chars("xyz"),
            BlendMode::WeightedSimilarityFirst,
            &config,
        );
        assert!(approx_eq(score, weighted));
    }

    #[test]
    fn test_linear_length_penalty() {
        let config = BlendConfig::default();
        let score = blend_scores(
            0.9,
            0.5,
            &chars("ab"),
            &chars("abcdef"),
            BlendMode::SimilarityOnly,
            &config,
        );
        assert!(approx_eq(score, 0.9 * (2.0 / 6.0)));
    }

    #[test]
    fn test_log_length_penalty() {
        let config =
            BlendConfig::default().with_length_penalty(Some(LengthPenalty::Logarithmic));
        let score = blend_scores(
            1.0,
            1.0,
            &chars("abc"),
            &chars("abcdefg"),
            BlendMode::SimilarityOnly,
            &config,
        );
        assert!(approx_eq(score, 2.0 / 8.0f32.log2()));
    }

    #[test]
    fn test_empty_text_forces_zero() {
        let config = BlendConfig::default();
        let empty: Vec<char> = Vec::new();
        for mode in BlendMode::ALL {
            assert_eq!(blend_scores(1.0, 1.0, &empty, &chars("abc"), mode, &config), 0.0);
            assert_eq!(blend_scores(1.0, 1.0, &chars("abc"), &empty, mode, &config), 0.0);
        }
    }

    #[test]
    fn test_mode_names() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.as_str().parse::<BlendMode>(), Ok(mode));
            assert_eq!(mode.to_string(), mode.as_str());
        }
        assert_eq!("Typo-Blend".parse::<BlendMode>(), Ok(BlendMode::TypoBlend));
        assert_eq!("max".parse::<BlendMode>(), Ok(BlendMode::MaxScore));
        assert_eq!(
            "cubic".parse::<BlendMode>(),
            Err(SpectrumError::UnknownBlendMode("cubic".to_string()))
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(BlendConfig::default().validate().is_ok());
        assert!(matches!(
            BlendConfig::default().with_weights(0.8, 0.3).validate(),
            Err(SpectrumError::InvalidWeight { .. })
        ));
        assert!(matches!(
            BlendConfig::default().with_weights(-0.1, 0.3).validate(),
            Err(SpectrumError::InvalidWeight { name: "similarity_weight", .. })
        ));
        let config = BlendConfig {
            ngram_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SpectrumError::InvalidNgramSize(0)));
    }

    #[test]
    fn test_scorer_identical_texts() {
        let scorer = SpectrumScorer::new(BlendMode::CombinedAverage, BlendConfig::default());
        assert!((scorer.similarity("apple", "apple") - 1.0).abs() < 1e-5);
        assert_eq!(scorer.name(), "combined_average");
    }

    #[test]
    fn test_scorer_transposed() {
        let scorer =
            SpectrumScorer::new(BlendMode::WeightedSimilarityFirst, BlendConfig::default());
        let close = scorer.similarity("appel", "apple");
        let far = scorer.similarity("appel", "orange");
        assert!(close > 0.95);
        assert!(far < close);
    }

    #[test]
    fn test_scorer_typo_detector() {
        let scorer = SpectrumScorer::default();
        assert_eq!(scorer.typo_detector().ngram_size, DEFAULT_NGRAM_SIZE);
    }
}
