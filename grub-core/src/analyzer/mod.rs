//! Text analysis pipeline.
//!
//! This module provides the text processing components:
//! - **Normalizer**: Lowercases, drops punctuation, collapses whitespace
//! - **Tokenizer**: Splits normalized text into words
//! - **Trigram**: Extracts padded 3-character windows per word

pub mod normalizer;
pub mod tokenizer;
pub mod trigram;

pub use normalizer::TextNormalizer;
pub use tokenizer::Tokenizer;
pub use trigram::{Analyzer, TrigramSet};
