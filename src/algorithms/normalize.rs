//! Look-alike character normalization
//!
//! Replaces digits and symbols commonly used as letter stand-ins
//! ("p4ssw0rd", "h3ll0") with the letters they imitate, so leetspeak
//! spellings compare closer to their plain forms.

use crate::error::{Result, SpectrumError};

const TABLE_SIZE: usize = 128;

/// Substitution pairs applied by the normalizer.
pub const SUBSTITUTIONS: [(char, char); 17] = [
    ('0', 'o'),
    ('1', 'l'),
    ('2', 'z'),
    ('3', 'e'),
    ('4', 'a'),
    ('5', 's'),
    ('6', 'g'),
    ('7', 't'),
    ('8', 'b'),
    ('9', 'g'),
    ('@', 'a'),
    ('$', 's'),
    ('!', 'i'),
    ('+', 't'),
    ('%', 'x'),
    ('^', 'v'),
    ('&', 'n'),
];

/// ASCII lookup table: identity everywhere except the substituted chars.
static TABLE: [char; TABLE_SIZE] = build_table();

const fn build_table() -> [char; TABLE_SIZE] {
    let mut table = ['\0'; TABLE_SIZE];
    let mut i = 0;
    while i < TABLE_SIZE {
        table[i] = i as u8 as char;
        i += 1;
    }

    let mut j = 0;
    while j < SUBSTITUTIONS.len() {
        let (from, to) = SUBSTITUTIONS[j];
        table[from as usize] = to;
        j += 1;
    }
    table
}

/// Look-alike replacement for a single char (identity if none).
#[inline]
#[must_use]
pub fn substitute(c: char) -> char {
    let code = c as usize;
    if code < TABLE_SIZE {
        TABLE[code]
    } else {
        c
    }
}

/// Normalize `input` into a caller-owned buffer.
///
/// Writes one char per input char and returns the number written. The buffer
/// must hold at least as many chars as `input`; nothing is allocated.
///
/// # Errors
/// `BufferTooSmall` if `output` is shorter than `input`.
pub fn normalize_text(input: &str, output: &mut [char]) -> Result<usize> {
    let required = input.chars().count();
    if output.len() < required {
        return Err(SpectrumError::BufferTooSmall {
            required,
            available: output.len(),
        });
    }

    for (slot, c) in output.iter_mut().zip(input.chars()) {
        *slot = substitute(c);
    }
    Ok(required)
}

/// Allocating variant of [`normalize_text`].
#[must_use]
pub fn normalize(input: &str) -> String {
    input.chars().map(substitute).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leetspeak() {
        assert_eq!(normalize("p4ssw0rd"), "password");
        assert_eq!(normalize("h3ll0 w0rld"), "hello world");
        assert_eq!(normalize("@dm!n"), "admin");
    }

    #[test]
    fn test_untouched_chars() {
        assert_eq!(normalize("Hello, World"), "Hello, World");
        assert_eq!(normalize("café"), "café");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_full_table() {
        assert_eq!(normalize("0123456789"), "olzeasgtbg");
        assert_eq!(normalize("@$!+%^&"), "asitxvn");
    }

    #[test]
    fn test_into_buffer() {
        let mut buffer = ['\0'; 16];
        let written = normalize_text("l33t", &mut buffer).unwrap();
        assert_eq!(written, 4);
        assert_eq!(&buffer[..written], &['l', 'e', 'e', 't']);
        // Slots past the input are left alone
        assert_eq!(buffer[4], '\0');
    }

    #[test]
    fn test_exact_fit_buffer() {
        let mut buffer = ['\0'; 3];
        assert_eq!(normalize_text("a1b", &mut buffer), Ok(3));
        assert_eq!(buffer, ['a', 'l', 'b']);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buffer = ['\0'; 2];
        assert_eq!(
            normalize_text("abc", &mut buffer),
            Err(SpectrumError::BufferTooSmall {
                required: 3,
                available: 2
            })
        );
    }
}
