//! Text normalization.
//!
//! The first stage of the analysis pipeline. Food descriptions arrive as
//! free text like `"Cheese, cheddar (sharp)"`; the normalizer turns that into
//! `"cheese cheddar sharp"` so the tokenizer can split on single spaces.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Normalizer for food descriptions and queries.
///
/// Performs the following operations:
/// - Converts letters to lowercase, one character to one character
/// - Keeps letters (general category `L*`) and decimal digits (`Nd`); other
///   numerics such as `½` or `²` are dropped
/// - Drops every other non-whitespace character without leaving a gap, so
///   `"ready-to-eat"` becomes `"readytoeat"`
/// - Collapses whitespace runs into single spaces
/// - Removes leading/trailing whitespace
///
/// ASCII input takes a byte-level fast path; anything else goes through
/// `char` classification.
///
/// # Examples
///
/// ```
/// use grub_core::analyzer::TextNormalizer;
///
/// let normalizer = TextNormalizer::new();
/// assert_eq!(normalizer.normalize("  Cheese,  CHEDDAR!  "), "cheese cheddar");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Creates a new normalizer.
    pub const fn new() -> Self {
        Self
    }

    /// Normalizes text into an existing String buffer.
    ///
    /// Clears the buffer before writing and reuses its capacity.
    pub fn normalize_into(&self, input: &str, out: &mut String) {
        out.clear();
        out.reserve(input.len());

        // A space is only written once the next kept character shows up,
        // which both collapses runs and trims the trailing edge.
        let mut pending_space = false;

        if input.is_ascii() {
            for &b in input.as_bytes() {
                if b.is_ascii_alphanumeric() {
                    if pending_space {
                        out.push(' ');
                        pending_space = false;
                    }
                    out.push(b.to_ascii_lowercase() as char);
                } else if is_space(b as char) {
                    pending_space = !out.is_empty();
                }
            }
            return;
        }

        for c in input.chars() {
            if is_letter_or_digit(c) {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                out.push(lower(c));
            } else if is_space(c) {
                pending_space = !out.is_empty();
            }
        }
    }

    /// Normalizes text into a new String.
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out);
        out
    }
}

#[inline(always)]
fn is_space(c: char) -> bool {
    c.is_whitespace()
}

fn is_letter_or_digit(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::DecimalNumber
    )
}

// Simple case mapping: 'İ' lowers to 'i', never to "i\u{307}".
#[inline(always)]
fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        TextNormalizer::new().normalize(s)
    }

    #[test]
    fn lowercases_ascii() {
        assert_eq!(norm("CHEESE"), "cheese");
        assert_eq!(norm("Cheddar Cheese"), "cheddar cheese");
    }

    #[test]
    fn drops_punctuation_without_boundary() {
        assert_eq!(norm("cheese!"), "cheese");
        assert_eq!(norm("Cheese, cheddar"), "cheese cheddar");
        assert_eq!(norm("ready-to-eat"), "readytoeat");
        assert_eq!(norm("(sharp)"), "sharp");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(norm("Milk, 2% fat"), "milk 2 fat");
    }

    #[test]
    fn collapses_and_trims_whitespace() {
        assert_eq!(norm("  apple \t\n pie  "), "apple pie");
        assert_eq!(norm("a\u{000B}b"), "a b");
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(norm(""), "");
        assert_eq!(norm("!?,.-"), "");
        assert_eq!(norm(" , ; "), "");
    }

    #[test]
    fn space_around_dropped_punctuation_collapses() {
        assert_eq!(norm("apple , pie"), "apple pie");
    }

    #[test]
    fn unicode_letters_lowercase() {
        assert_eq!(norm("CAFÉ Crème"), "café crème");
        assert_eq!(norm("Jalapeño\u{00A0}peppers"), "jalapeño peppers");
    }

    #[test]
    fn non_decimal_numerics_are_dropped() {
        assert_eq!(norm("Milk ½ cup"), "milk cup");
        assert_eq!(norm("x² ³ ¼"), "x");
        assert_eq!(norm("Ⅻ"), "");
        assert_eq!(norm("٣ ३"), "٣ ३");
    }

    #[test]
    fn lowercase_is_one_to_one() {
        assert_eq!(norm("İ"), "i");
        assert_eq!(norm("İSTANBUL"), "istanbul");
    }

    #[test]
    fn normalize_into_reuses_buffer() {
        let normalizer = TextNormalizer::new();
        let mut buf = String::from("stale contents");
        normalizer.normalize_into("Fresh", &mut buf);
        assert_eq!(buf, "fresh");
    }
}
