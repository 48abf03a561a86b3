//! Word Tokenizer
//!
//! Splits normalized text into words. Given `"cheddar cheese block"` it emits
//! each word with its position:
//!
//! ```ignore
//! ("cheddar", 0)
//! ("cheese", 1)
//! ("block", 2)
//! ```
//!
//! Tokens are slices of the input, so tokenizing allocates nothing. The input
//! must come from [`TextNormalizer`](super::TextNormalizer): no leading or
//! trailing spaces and no consecutive spaces. Debug builds assert this.

use memchr::memchr_iter;

/// Streaming word splitter over normalized text.
///
/// ## Example
///
/// ```
/// use grub_core::analyzer::Tokenizer;
///
/// let mut words = Vec::new();
/// Tokenizer::new().tokenize("cheddar cheese", |word, _pos| words.push(word));
/// assert_eq!(words, ["cheddar", "cheese"]);
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Tokenizer;

impl Tokenizer {
    /// Creates a new tokenizer.
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Tokenizes normalized input and emits `(word, position)`.
    ///
    /// Splits on ASCII space only. Position is the zero-based word index.
    #[inline(always)]
    pub fn tokenize<'n, F>(&self, normalized: &'n str, mut emit: F)
    where
        F: FnMut(&'n str, u32),
    {
        debug_assert!(
            !normalized.starts_with(' ') && !normalized.ends_with(' '),
            "tokenizer: leading or trailing space, normalizer contract violated"
        );
        debug_assert!(
            !normalized.contains("  "),
            "tokenizer: consecutive spaces, normalizer contract violated"
        );

        if normalized.is_empty() {
            return;
        }

        let bytes = normalized.as_bytes();
        let mut start = 0usize;
        let mut pos = 0u32;

        for i in memchr_iter(b' ', bytes) {
            if start < i {
                // ASCII space is never part of a multi-byte sequence, so both
                // ends of the slice fall on char boundaries.
                emit(&normalized[start..i], pos);
                pos = pos.saturating_add(1);
            }
            start = i + 1;
        }

        if start < bytes.len() {
            emit(&normalized[start..], pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str) -> Vec<(&str, u32)> {
        let mut out = Vec::new();
        Tokenizer::new().tokenize(input, |word, pos| out.push((word, pos)));
        out
    }

    #[test]
    fn single_word() {
        assert_eq!(collect("cheese"), [("cheese", 0)]);
    }

    #[test]
    fn positions_are_sequential() {
        let out = collect("cheddar cheese block");
        assert_eq!(out, [("cheddar", 0), ("cheese", 1), ("block", 2)]);
    }

    #[test]
    fn empty_emits_nothing() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn single_char_token() {
        assert_eq!(collect("a"), [("a", 0)]);
    }

    #[test]
    fn multibyte_words_split_cleanly() {
        assert_eq!(collect("café crème"), [("café", 0), ("crème", 1)]);
    }

    #[test]
    fn tokens_are_slices_of_input() {
        let input = String::from("apple pie");
        let base = input.as_ptr() as usize;
        let end = base + input.len();

        Tokenizer::new().tokenize(&input, |word, _| {
            let ptr = word.as_ptr() as usize;
            assert!(ptr >= base && ptr < end);
        });
    }
}
