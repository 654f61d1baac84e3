//! Transposition score
//!
//! `1 - Σ|aᵢ - bᵢ| / Σmax(aᵢ, bᵢ)`: how much of the combined magnitude of two
//! spectra is spent on slot-wise differences. Swapping two adjacent chars
//! only moves weight between the two slots involved, so transposed spellings
//! keep a high score. Both vectors all-zero scores 1.0.

use super::cosine::LANES;
use super::vectorize::Spectrum;
use crate::error::{Result, SpectrumError};

#[inline]
fn check_lengths(query: &[f32], candidate: &[f32]) -> Result<()> {
    if query.len() != candidate.len() {
        return Err(SpectrumError::LengthMismatch {
            left: query.len(),
            right: candidate.len(),
        });
    }
    Ok(())
}

#[inline]
fn finish(sum_diff: f32, sum_max: f32) -> f32 {
    if sum_max == 0.0 {
        1.0
    } else {
        1.0 - sum_diff / sum_max
    }
}

/// Batched transposition score.
///
/// # Errors
/// `LengthMismatch` if the vectors differ in length.
pub fn transposition_score(query: &[f32], candidate: &[f32]) -> Result<f32> {
    check_lengths(query, candidate)?;
    Ok(batched(query, candidate))
}

/// Transposition score of two spectra, which are aligned by construction.
#[inline]
#[must_use]
pub fn spectrum_transposition(query: &Spectrum, candidate: &Spectrum) -> f32 {
    batched(query, candidate)
}

fn batched(query: &[f32], candidate: &[f32]) -> f32 {
    let chunks_q = query.chunks_exact(LANES);
    let chunks_c = candidate.chunks_exact(LANES);
    let rest_q = chunks_q.remainder();
    let rest_c = chunks_c.remainder();

    let mut diff = [0.0f32; LANES];
    let mut max = [0.0f32; LANES];

    for (chunk_q, chunk_c) in chunks_q.zip(chunks_c) {
        for lane in 0..LANES {
            let q = chunk_q[lane];
            let c = chunk_c[lane];
            diff[lane] += (q - c).abs();
            max[lane] += q.max(c);
        }
    }

    let mut sum_diff: f32 = diff.iter().sum();
    let mut sum_max: f32 = max.iter().sum();

    for (&q, &c) in rest_q.iter().zip(rest_c) {
        sum_diff += (q - c).abs();
        sum_max += q.max(c);
    }

    finish(sum_diff, sum_max)
}

/// Plain single-accumulator transposition score.
///
/// # Errors
/// `LengthMismatch` if the vectors differ in length.
pub fn transposition_score_scalar(query: &[f32], candidate: &[f32]) -> Result<f32> {
    check_lengths(query, candidate)?;

    let mut sum_diff = 0.0f32;
    let mut sum_max = 0.0f32;
    for (&q, &c) in query.iter().zip(candidate) {
        sum_diff += (q - c).abs();
        sum_max += q.max(c);
    }

    Ok(finish(sum_diff, sum_max))
}
