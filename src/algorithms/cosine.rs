//! Cosine similarity over spectra
//!
//! `dot(a, b) / sqrt(|a|² · |b|²)`, compared over the shorter of the two
//! inputs. A zero magnitude on either side yields 0.0.
//!
//! The batched variant keeps [`LANES`] independent partial sums so the inner
//! loop auto-vectorizes, then folds the lanes and finishes the remainder with
//! a scalar loop. Lane width only changes summation order, so results match
//! the scalar variant within float tolerance.
//!
//! # Complexity
//! - Time: O(n)
//! - Space: O(1)

/// Width of the partial-sum batches.
pub const LANES: usize = 8;

#[inline]
fn finish(dot: f32, magnitude_a: f32, magnitude_b: f32) -> f32 {
    let magnitude = magnitude_a * magnitude_b;
    if magnitude == 0.0 {
        0.0
    } else {
        dot / magnitude.sqrt()
    }
}

/// Batched cosine similarity.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let length = a.len().min(b.len());
    let chunks_a = a[..length].chunks_exact(LANES);
    let chunks_b = b[..length].chunks_exact(LANES);
    let rest_a = chunks_a.remainder();
    let rest_b = chunks_b.remainder();

    let mut dot = [0.0f32; LANES];
    let mut magnitude_a = [0.0f32; LANES];
    let mut magnitude_b = [0.0f32; LANES];

    for (chunk_a, chunk_b) in chunks_a.zip(chunks_b) {
        for lane in 0..LANES {
            let va = chunk_a[lane];
            let vb = chunk_b[lane];
            dot[lane] += va * vb;
            magnitude_a[lane] += va * va;
            magnitude_b[lane] += vb * vb;
        }
    }

    let mut dot_sum: f32 = dot.iter().sum();
    let mut magnitude_a_sum: f32 = magnitude_a.iter().sum();
    let mut magnitude_b_sum: f32 = magnitude_b.iter().sum();

    for (&va, &vb) in rest_a.iter().zip(rest_b) {
        dot_sum += va * vb;
        magnitude_a_sum += va * va;
        magnitude_b_sum += vb * vb;
    }

    finish(dot_sum, magnitude_a_sum, magnitude_b_sum)
}

/// Plain single-accumulator cosine similarity.
#[must_use]
pub fn cosine_similarity_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut magnitude_a = 0.0f32;
    let mut magnitude_b = 0.0f32;

    for (&va, &vb) in a.iter().zip(b) {
        dot += va * vb;
        magnitude_a += va * va;
        magnitude_b += vb * vb;
    }

    finish(dot, magnitude_a, magnitude_b)
}
