//! Python bindings (`fuzzyspectrum._core`).
//!
//! Exposes a string-keyed `SpectrumFinder` plus the individual scoring
//! stages as free functions. Long scans release the GIL.

use std::collections::HashMap;

use pyo3::create_exception;
use pyo3::prelude::*;

use crate::algorithms::{self, BlendConfig, BlendMode, LengthPenalty, Similarity};
use crate::config::{FinderConfig, DEFAULT_NGRAM_SIZE, MAX_LENGTH, VECTOR_SIZE};
use crate::error::SpectrumError;
use crate::spectrum::StringFinder;

// ============================================================================
// Custom Python Exceptions
// ============================================================================
//
// FuzzySpectrumError (base)
//   ├── ValidationError - Invalid thresholds, weights or n-gram sizes
//   ├── BlendModeError - Unknown blend mode name
//   └── LengthError - Text too long, vector length mismatch, buffer too small

create_exception!(fuzzyspectrum, FuzzySpectrumError, pyo3::exceptions::PyException);
create_exception!(fuzzyspectrum, ValidationError, FuzzySpectrumError);
create_exception!(fuzzyspectrum, BlendModeError, FuzzySpectrumError);
create_exception!(fuzzyspectrum, LengthError, FuzzySpectrumError);

impl From<SpectrumError> for PyErr {
    fn from(err: SpectrumError) -> Self {
        let message = err.to_string();
        match err {
            SpectrumError::TextTooLong { .. }
            | SpectrumError::LengthMismatch { .. }
            | SpectrumError::BufferTooSmall { .. } => LengthError::new_err(message),
            SpectrumError::UnknownBlendMode(_) => BlendModeError::new_err(message),
            SpectrumError::InvalidThreshold(_)
            | SpectrumError::InvalidWeight { .. }
            | SpectrumError::InvalidNgramSize(_) => ValidationError::new_err(message),
        }
    }
}

/// Parse length penalty name ("linear", "log"/"logarithmic") or None to disable
fn parse_length_penalty(name: Option<&str>) -> PyResult<Option<LengthPenalty>> {
    match name.map(str::to_lowercase).as_deref() {
        None | Some("none") => Ok(None),
        Some("linear") => Ok(Some(LengthPenalty::Linear)),
        Some("log") | Some("logarithmic") => Ok(Some(LengthPenalty::Logarithmic)),
        Some(other) => Err(ValidationError::new_err(format!(
            "Unknown length penalty: '{}'. Valid: linear, logarithmic, none",
            other
        ))),
    }
}

/// Fuzzy matcher over a corpus of strings.
///
/// Build once, then query. Building while another thread queries is not
/// supported.
#[pyclass(name = "SpectrumFinder")]
struct PySpectrumFinder {
    inner: StringFinder,
}

#[pymethods]
impl PySpectrumFinder {
    #[new]
    #[pyo3(signature = (
        mode="similarity_only",
        threshold=0.7,
        similarity_weight=0.6,
        typo_weight=0.3,
        typo_threshold=0.5,
        ngram_size=DEFAULT_NGRAM_SIZE,
        length_penalty=Some("linear")
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        mode: &str,
        threshold: f32,
        similarity_weight: f32,
        typo_weight: f32,
        typo_threshold: f32,
        ngram_size: usize,
        length_penalty: Option<&str>,
    ) -> PyResult<Self> {
        let blend = BlendConfig {
            similarity_weight,
            typo_weight,
            ngram_size,
            typo_threshold,
            length_penalty: parse_length_penalty(length_penalty)?,
        };
        let config = FinderConfig::new(mode.parse()?, threshold).with_blend(blend);
        Ok(Self {
            inner: StringFinder::with_config(String::as_str, config)?,
        })
    }

    /// Add strings to the corpus. Duplicates are ignored.
    fn build(&mut self, py: Python<'_>, items: Vec<String>) {
        let inner = &mut self.inner;
        py.allow_threads(|| inner.build_parallel(items));
    }

    /// Best-matching corpus string, or None for an empty corpus.
    ///
    /// Raises LengthError if the query is longer than MAX_LENGTH chars.
    fn find_best_match(&self, py: Python<'_>, query: String) -> PyResult<Option<String>> {
        Ok(py.allow_threads(|| self.inner.find_best_match(&query))?)
    }

    /// Best match as a (text, score) tuple.
    fn find_best_match_scored(
        &self,
        py: Python<'_>,
        query: String,
    ) -> PyResult<Option<(String, f32)>> {
        Ok(py.allow_threads(|| self.inner.find_best_match_scored(&query))?)
    }

    /// All corpus strings scoring at or above the threshold.
    ///
    /// Returns an empty dict for queries longer than MAX_LENGTH chars.
    #[pyo3(signature = (query, threshold=None))]
    fn find_similar_matches(
        &self,
        py: Python<'_>,
        query: String,
        threshold: Option<f32>,
    ) -> PyResult<HashMap<String, f32>> {
        let threshold = threshold.unwrap_or_else(|| self.inner.threshold());
        let matches = py.allow_threads(|| {
            self.inner
                .find_similar_matches_with_threshold(&query, threshold)
        })?;
        Ok(matches.into_iter().collect())
    }

    /// Best match for each query, processed in parallel.
    fn batch_find_best_match(
        &self,
        py: Python<'_>,
        queries: Vec<String>,
    ) -> PyResult<Vec<Option<String>>> {
        let results = py.allow_threads(|| self.inner.find_best_matches_batch(&queries));
        Ok(results.into_iter().collect::<Result<Vec<_>, _>>()?)
    }

    #[getter]
    fn mode(&self) -> &'static str {
        self.inner.mode().as_str()
    }

    #[getter]
    fn threshold(&self) -> f32 {
        self.inner.threshold()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __contains__(&self, text: String) -> bool {
        self.inner.contains(&text)
    }

    fn __repr__(&self) -> String {
        format!(
            "SpectrumFinder(mode='{}', threshold={:.3}, size={})",
            self.inner.mode(),
            self.inner.threshold(),
            self.inner.len()
        )
    }
}

/// Replace look-alike digits and symbols with letters ("p4ssw0rd" -> "password").
#[pyfunction]
fn normalize_text(text: &str) -> String {
    algorithms::normalize(text)
}

/// Positional spectrum of a string (128 floats).
#[pyfunction]
fn vectorize(text: &str) -> Vec<f32> {
    algorithms::vectorize(text).to_vec()
}

/// Cosine similarity of two vectors.
#[pyfunction]
fn cosine_similarity(a: Vec<f32>, b: Vec<f32>) -> f32 {
    algorithms::cosine_similarity(&a, &b)
}

/// Transposition score of two equal-length vectors.
///
/// Raises LengthError if the lengths differ.
#[pyfunction]
fn transposition_score(a: Vec<f32>, b: Vec<f32>) -> PyResult<f32> {
    Ok(algorithms::transposition_score(&a, &b)?)
}

/// Approximate n-gram Jaccard similarity after look-alike normalization.
#[pyfunction]
#[pyo3(signature = (a, b, ngram_size=DEFAULT_NGRAM_SIZE))]
fn jaccard_ngram_similarity(a: &str, b: &str, ngram_size: usize) -> PyResult<f64> {
    if ngram_size == 0 {
        return Err(SpectrumError::InvalidNgramSize(ngram_size).into());
    }
    Ok(algorithms::TypoDetector::new(ngram_size).similarity(a, b))
}

/// Blended spectrum score of two strings under the given mode.
#[pyfunction]
#[pyo3(signature = (a, b, mode="similarity_only"))]
fn spectrum_similarity(a: &str, b: &str, mode: &str) -> PyResult<f64> {
    let mode: BlendMode = mode.parse()?;
    let scorer = algorithms::SpectrumScorer::new(mode, BlendConfig::default());
    Ok(scorer.similarity(a, b))
}

#[pymodule]
fn _core(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Custom exceptions
    m.add("FuzzySpectrumError", py.get_type::<FuzzySpectrumError>())?;
    m.add("ValidationError", py.get_type::<ValidationError>())?;
    m.add("BlendModeError", py.get_type::<BlendModeError>())?;
    m.add("LengthError", py.get_type::<LengthError>())?;

    m.add_class::<PySpectrumFinder>()?;

    m.add_function(wrap_pyfunction!(normalize_text, m)?)?;
    m.add_function(wrap_pyfunction!(vectorize, m)?)?;
    m.add_function(wrap_pyfunction!(cosine_similarity, m)?)?;
    m.add_function(wrap_pyfunction!(transposition_score, m)?)?;
    m.add_function(wrap_pyfunction!(jaccard_ngram_similarity, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_similarity, m)?)?;

    m.add("MAX_LENGTH", MAX_LENGTH)?;
    m.add("VECTOR_SIZE", VECTOR_SIZE)?;
    m.add(
        "BLEND_MODES",
        BlendMode::ALL.iter().map(BlendMode::as_str).collect::<Vec<_>>(),
    )?;

    Ok(())
}
