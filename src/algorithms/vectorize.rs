//! Positional character spectra
//!
//! A text is encoded as a fixed 128-slot vector where slot `i` holds the
//! weight of the char at position `i`: `code / 127.0` for ASCII, and
//! [`UNMAPPED_WEIGHT`] for anything else. Slots past the end of the text are
//! zero. The slot is chosen by position, not by char code, so two texts
//! compare by what sits where, and a transposition only disturbs the slots it
//! touches.

use crate::config::{MAX_CHAR_CODE, UNMAPPED_WEIGHT, VECTOR_SIZE};

/// A vectorized text.
pub type Spectrum = [f32; VECTOR_SIZE];

/// An all-zero spectrum (the encoding of the empty string).
pub const EMPTY_SPECTRUM: Spectrum = [0.0; VECTOR_SIZE];

/// Weight of a single char.
#[inline]
#[must_use]
pub fn char_weight(c: char) -> f32 {
    let code = c as u32;
    if code <= MAX_CHAR_CODE {
        code as f32 / MAX_CHAR_CODE as f32
    } else {
        UNMAPPED_WEIGHT
    }
}

/// Encode `text` into a caller-owned buffer.
///
/// The buffer is cleared first. Encoding stops at whichever ends first, the
/// text or the buffer; chars that do not fit are not encoded.
pub fn vectorize_into(text: &str, output: &mut [f32]) {
    output.fill(0.0);
    for (slot, c) in output.iter_mut().zip(text.chars()) {
        *slot = char_weight(c);
    }
}

/// Encode `text` into a new spectrum.
///
/// Accepts text of any length; only the first [`VECTOR_SIZE`] chars are
/// encoded.
#[must_use]
pub fn vectorize(text: &str) -> Spectrum {
    let mut spectrum = EMPTY_SPECTRUM;
    vectorize_into(text, &mut spectrum);
    spectrum
}
