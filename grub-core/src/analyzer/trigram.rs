//! Trigram extraction module.
//!
//! Turns words into overlapping 3-character windows. Every word is seeded with
//! two [`Trigram::PAD`] slots so its first characters anchor prefix matches,
//! and closed with one [`Trigram::BOUNDARY`] gram so word endings match on
//! their own.

use grub_types::Trigram;
use rustc_hash::FxHashSet;

use super::normalizer::TextNormalizer;
use super::tokenizer::Tokenizer;

/// Distinct trigrams of a text.
pub type TrigramSet = FxHashSet<Trigram>;

/// Extracts the trigrams of a single normalized word.
///
/// A word of N characters emits N padded/sliding grams plus one boundary
/// gram. Duplicates are emitted as they occur.
///
/// # Example
///
/// ```
/// use grub_core::analyzer::trigram::extract_trigrams;
///
/// let mut grams = Vec::new();
/// extract_trigrams("pie", |t| grams.push(t.key()));
///
/// assert_eq!(grams, ["\0\0p", "\0pi", "pie", "ie "]);
/// ```
#[inline(always)]
pub fn extract_trigrams<F>(word: &str, mut callback: F)
where
    F: FnMut(Trigram),
{
    if word.is_empty() {
        return;
    }

    let mut window = Trigram::new(Trigram::PAD, Trigram::PAD, Trigram::PAD);
    for c in word.chars() {
        window = window.shift(c);
        callback(window);
    }
    callback(window.shift(Trigram::BOUNDARY));
}

/// Counts the grams [`extract_trigrams`] emits for a word, duplicates included.
#[inline(always)]
pub fn count_trigrams(word: &str) -> usize {
    match word.chars().count() {
        0 => 0,
        n => n + 1,
    }
}

/// The full text pipeline: normalize, split into words, extract trigrams.
///
/// Index build and query time must go through the same analyzer, otherwise
/// overlap counts mean nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Analyzer {
    normalizer: TextNormalizer,
    tokenizer: Tokenizer,
}

impl Analyzer {
    /// Creates the standard analyzer.
    pub const fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            tokenizer: Tokenizer::new(),
        }
    }

    /// Returns the distinct trigrams of `text`.
    ///
    /// # Example
    ///
    /// ```
    /// use grub_core::analyzer::Analyzer;
    ///
    /// let analyzer = Analyzer::new();
    /// assert_eq!(analyzer.trigrams("Cheese!"), analyzer.trigrams("cheese"));
    /// assert!(analyzer.trigrams("?!").is_empty());
    /// ```
    pub fn trigrams(&self, text: &str) -> TrigramSet {
        let mut buf = String::with_capacity(text.len());
        let mut set = TrigramSet::default();
        self.trigrams_into(text, &mut buf, &mut set);
        set
    }

    /// Collects the distinct trigrams of `text` into `set`, using `buf` as
    /// scratch space for the normalized text. Both are cleared first.
    pub fn trigrams_into(&self, text: &str, buf: &mut String, set: &mut TrigramSet) {
        set.clear();
        self.normalizer.normalize_into(text, buf);
        self.tokenizer.tokenize(buf, |word, _| {
            set.reserve(count_trigrams(word));
            extract_trigrams(word, |t| {
                set.insert(t);
            });
        });
    }
}
