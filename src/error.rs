//! Error types for spectrum matching.

use thiserror::Error;

/// Errors raised by the normalizer, the metrics, configuration and the finder.
///
/// Every variant is a deterministic function of input shape: nothing here is
/// transient, so callers should never retry on these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectrumError {
    /// Query text is longer than the supported maximum
    #[error("Text length {length} exceeds the maximum supported length of {max}")]
    TextTooLong { length: usize, max: usize },

    /// Two vectors that must be aligned slot-for-slot have different lengths
    #[error("Vectors must be the same length, got {left} and {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Caller-supplied output buffer cannot hold the input
    #[error("Output buffer too small: need {required}, got {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// Blend mode name that does not match any known strategy
    #[error("Unknown blend mode: '{0}'")]
    UnknownBlendMode(String),

    /// Threshold outside [0.0, 1.0] or not finite
    #[error("Threshold must be in range [0.0, 1.0], got {0}")]
    InvalidThreshold(f32),

    /// Blend weight outside its valid range
    #[error("{name} must be in range [0.0, 1.0], got {value}")]
    InvalidWeight { name: &'static str, value: f32 },

    /// N-gram size of zero
    #[error("N-gram size must be at least 1, got {0}")]
    InvalidNgramSize(usize),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SpectrumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SpectrumError::TextTooLong { length: 300, max: 256 };
        assert_eq!(
            err.to_string(),
            "Text length 300 exceeds the maximum supported length of 256"
        );

        let err = SpectrumError::UnknownBlendMode("fancy".to_string());
        assert_eq!(err.to_string(), "Unknown blend mode: 'fancy'");
    }
}
