//! Text normalization.
//!
//! Turns validated input into the canonical form fed to the tokenizer.
//! The individual steps live in [`stages`]; [`TextNormalizer`] chains them.

pub mod stages;

use std::fmt;

use crate::policy::CharacterPolicy;

/// Upper bound on cleanup passes. Each pass only shrinks the text, so the
/// loop settles long before this in practice.
const MAX_CLEANUP_PASSES: usize = 8;

/// Canonicalized text: lowercase policy characters separated by single spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Returns the normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of Unicode scalar values.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Number of space-separated words.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    /// Returns true if nothing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the wrapper.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deterministic text normalizer.
#[derive(Debug, Clone, Copy)]
pub struct TextNormalizer {
    policy: &'static CharacterPolicy,
}

impl TextNormalizer {
    /// Creates a normalizer for the Somali policy.
    pub fn new() -> Self {
        Self {
            policy: CharacterPolicy::somali(),
        }
    }

    /// Normalizes `text`.
    ///
    /// Character-level steps run once; the cleanup steps (whitespace,
    /// punctuation, repeated words and phrases, duplicate sentences) repeat
    /// until the text stops changing, so `normalize` is idempotent.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let text = stages::strip_diacritics(text);
        let text = stages::lowercase(&text);
        let mut text = stages::filter_characters(&text, self.policy);

        for _ in 0..MAX_CLEANUP_PASSES {
            let next = cleanup_pass(&text);
            if next == text {
                break;
            }
            text = next;
        }

        NormalizedText(text)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn cleanup_pass(text: &str) -> String {
    let text = stages::collapse_whitespace(text);
    let text = stages::collapse_punctuation(&text);
    let text = stages::collapse_repeated_words(&text);
    let text = stages::collapse_repeated_phrases(&text);
    stages::dedupe_sentences(&text)
}

/// Normalizes `text` with the default Somali policy.
pub fn normalize(text: &str) -> NormalizedText {
    TextNormalizer::new().normalize(text)
}
