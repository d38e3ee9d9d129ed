// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Text normalization pipeline
//!
//! Turns raw message text into the feature string the classifier was trained
//! on: non-letters become spaces, the text is lowercased and tokenized on
//! whitespace, stopwords are dropped and each remaining token is stemmed.

use std::{collections::HashSet, fmt, sync::LazyLock};

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use crate::{stopwords, types::NormalizedText};

// Compile regex once at startup - safe because pattern is static
static NON_LETTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z]").expect("non-letter regex is valid"));

/// Deterministic text-to-feature-string transform
///
/// Holds no mutable state, so a single instance can be shared across request
/// tasks without synchronization.
pub struct TextNormalizer {
    stopwords: &'static HashSet<&'static str>,
    stemmer: Stemmer,
}

impl TextNormalizer {
    /// Create a normalizer using the English stopword list and Snowball English stemmer
    ///
    /// Classifier artifacts must be trained on text normalized with this same
    /// stemmer (Snowball English, also known as Porter2). Stems from the
    /// original Porter algorithm differ for many words and would miss the
    /// artifact's vocabulary.
    pub fn english() -> Self {
        Self {
            stopwords: stopwords::english(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Normalize a raw text
    ///
    /// Empty input, or input without any letters, yields an empty string.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let letters_only = NON_LETTER_REGEX.replace_all(text, " ");
        let lowered = letters_only.to_lowercase();

        let stems: Vec<String> = lowered
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(token))
            .map(|token| self.stemmer.stem(token).into_owned())
            .collect();

        NormalizedText::new(stems.join(" "))
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("stopwords", &self.stopwords.len())
            .field("stemmer", &"snowball-english")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn spam_sample_is_normalized() {
        let normalizer = TextNormalizer::english();
        let normalized = normalizer.normalize("WIN A FREE PRIZE NOW!!!");
        assert_eq!(normalized.as_str(), "win free prize");
    }

    #[test]
    fn stems_and_drops_stopwords() {
        let normalizer = TextNormalizer::english();
        let normalized = normalizer.normalize("The meetings are running late, sorry!");
        assert_eq!(normalized.as_str(), "meet run late sorri");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        let normalizer = TextNormalizer::english();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("   \t\n ").is_empty());
    }

    #[test]
    fn digits_and_punctuation_yield_empty_string() {
        let normalizer = TextNormalizer::english();
        for input in ["12345", "!!!???", "3.14 + 2 = 5.14", "$$$ 100% !!!", "@#%^&*()"] {
            assert!(
                normalizer.normalize(input).is_empty(),
                "{input:?} should normalize to empty"
            );
        }
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        let normalizer = TextNormalizer::english();
        // 'é' is outside the ASCII letter range and splits the word
        assert_eq!(normalizer.normalize("cafébar").as_str(), "caf bar");
        assert!(normalizer.normalize("日本語").is_empty());
    }

    #[test]
    fn whitespace_is_collapsed() {
        let normalizer = TextNormalizer::english();
        let normalized = normalizer.normalize("  cash\t\tprize \n\n claim ");
        assert_eq!(normalized.as_str(), "cash prize claim");
    }

    #[test]
    fn normalization_is_idempotent_across_calls() {
        let normalizer = TextNormalizer::english();
        let input = "URGENT!! You have WON £1000 cash. Call 09061701461 to claim.";
        let first = normalizer.normalize(input);
        for _ in 0..10 {
            assert_eq!(normalizer.normalize(input), first);
        }
    }

    #[test]
    fn normalization_is_consistent_across_threads() {
        let normalizer = Arc::new(TextNormalizer::english());
        let input = "Congratulations, you have been selected for a free cruise";
        let expected = normalizer.normalize(input);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let normalizer = Arc::clone(&normalizer);
                thread::spawn(move || normalizer.normalize(input))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
