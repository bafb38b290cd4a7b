//! Input validation.
//!
//! Raw text passes through an ordered list of checks before any expensive
//! work happens. The first failing check decides the reported reason:
//!
//! 1. Emptiness
//! 2. Numeric-only content
//! 3. Emoji and pictographs
//! 4. Characters outside the [`CharacterPolicy`]
//! 5. Language identity (optional detector, long inputs only)

use std::ops::RangeInclusive;
use std::sync::Arc;

use tracing::debug;

use crate::language::{LanguageCode, LanguageDetector};
use crate::policy::CharacterPolicy;

/// Maximum number of offending characters echoed back to the caller.
const DISALLOWED_SAMPLE_SIZE: usize = 5;

/// Code point ranges treated as emoji or pictographs.
const PICTOGRAPH_RANGES: &[RangeInclusive<u32>] = &[
    // Zero width joiner (emoji sequences)
    0x200D..=0x200D,
    // Combining enclosing keycap
    0x20E3..=0x20E3,
    // Miscellaneous symbols
    0x2600..=0x26FF,
    // Dingbats
    0x2700..=0x27BF,
    // Variation selectors
    0xFE00..=0xFE0F,
    // Regional indicator flags
    0x1F1E0..=0x1F1FF,
    // Symbols and pictographs
    0x1F300..=0x1F5FF,
    // Emoticons
    0x1F600..=0x1F64F,
    // Transport and map symbols
    0x1F680..=0x1F6FF,
    // Everything outside the basic multilingual plane
    0x10000..=0x10FFFF,
];

/// Reasons a raw input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No non-whitespace characters.
    #[error("Text input cannot be empty")]
    EmptyInput,

    /// Only digits once spaces are removed.
    #[error("Text cannot consist of numbers only")]
    NumericOnly,

    /// Contains an emoji or pictograph.
    #[error("Emojis and pictographs are not allowed")]
    EmojiNotAllowed,

    /// Contains characters outside the alphabet and punctuation set.
    /// Carries a sample of up to five offending characters.
    #[error("Text contains characters that are not allowed: {0}")]
    DisallowedCharacters(String),

    /// Confidently identified as a language other than Somali.
    #[error("Text does not appear to be Somali (detected language: {0})")]
    NotTargetLanguage(LanguageCode),
}

impl ValidationError {
    /// Returns the reason code for this rejection.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::EmptyInput => "EMPTY_INPUT",
            ValidationError::NumericOnly => "NUMERIC_ONLY",
            ValidationError::EmojiNotAllowed => "EMOJI_NOT_ALLOWED",
            ValidationError::DisallowedCharacters(_) => "DISALLOWED_CHARACTERS",
            ValidationError::NotTargetLanguage(_) => "NOT_TARGET_LANGUAGE",
        }
    }
}

/// Thresholds for the validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Minimum word count before the language check runs.
    pub langid_min_words: usize,
    /// Minimum character count before the language check runs.
    pub langid_min_chars: usize,
    /// Language the service accepts.
    pub target_language: LanguageCode,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            langid_min_words: 3,
            langid_min_chars: 10,
            target_language: LanguageCode::somali(),
        }
    }
}

/// Gatekeeper for raw user input.
#[derive(Clone)]
pub struct InputValidator {
    policy: &'static CharacterPolicy,
    detector: Option<Arc<dyn LanguageDetector>>,
    config: ValidatorConfig,
}

impl InputValidator {
    /// Creates a validator with the Somali policy and no language detector.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            policy: CharacterPolicy::somali(),
            detector: None,
            config,
        }
    }

    /// Attaches a language detector.
    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Returns true if a language detector is configured.
    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// Returns the validator configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Runs all checks in order and returns the first failure.
    pub fn validate(&self, text: &str) -> Result<(), ValidationError> {
        let result = self.run_checks(text);
        if let Err(ref e) = result {
            debug!(reason = e.reason(), len = text.len(), "Input rejected");
        }
        result
    }

    fn run_checks(&self, text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyInput);
        }

        if is_numeric_only(text) {
            return Err(ValidationError::NumericOnly);
        }

        if contains_pictograph(text) {
            return Err(ValidationError::EmojiNotAllowed);
        }

        let disallowed = self.disallowed_characters(text);
        if !disallowed.is_empty() {
            return Err(ValidationError::DisallowedCharacters(format_sample(
                &disallowed,
            )));
        }

        self.check_language(text)
    }

    /// Collects every distinct character outside the policy, in order of
    /// first appearance.
    fn disallowed_characters(&self, text: &str) -> Vec<char> {
        let mut found = Vec::new();
        for c in text.chars() {
            if c.is_whitespace() || c.is_ascii_digit() || self.policy.accepts(c) {
                continue;
            }
            if !found.contains(&c) {
                found.push(c);
            }
        }
        found
    }

    fn check_language(&self, text: &str) -> Result<(), ValidationError> {
        let Some(detector) = &self.detector else {
            return Ok(());
        };

        let trimmed = text.trim();
        let words = trimmed.split_whitespace().count();
        let chars = trimmed.chars().count();
        if words < self.config.langid_min_words || chars < self.config.langid_min_chars {
            return Ok(());
        }

        match detector.detect(trimmed) {
            Some(code) if code != self.config.target_language => {
                debug!(detector = detector.name(), detected = %code, "Language mismatch");
                Err(ValidationError::NotTargetLanguage(code))
            }
            _ => Ok(()),
        }
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

fn is_numeric_only(text: &str) -> bool {
    let mut digits = text.chars().filter(|&c| c != ' ').peekable();
    digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
}

/// Returns true if any code point falls in a pictograph range.
pub fn contains_pictograph(text: &str) -> bool {
    text.chars().any(|c| {
        let cp = c as u32;
        PICTOGRAPH_RANGES.iter().any(|range| range.contains(&cp))
    })
}

fn format_sample(chars: &[char]) -> String {
    let sample: Vec<String> = chars
        .iter()
        .take(DISALLOWED_SAMPLE_SIZE)
        .map(char::to_string)
        .collect();
    let mut out = sample.join(", ");
    if chars.len() > DISALLOWED_SAMPLE_SIZE {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDetector(&'static str);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> Option<LanguageCode> {
            Some(LanguageCode::new(self.0))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct UnsureDetector;

    impl LanguageDetector for UnsureDetector {
        fn detect(&self, _text: &str) -> Option<LanguageCode> {
            None
        }

        fn name(&self) -> &'static str {
            "unsure"
        }
    }

    fn validator() -> InputValidator {
        InputValidator::default()
    }

    fn english_detecting() -> InputValidator {
        InputValidator::default().with_detector(Arc::new(FixedDetector("en")))
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(validator().validate(""), Err(ValidationError::EmptyInput));
        assert_eq!(
            validator().validate(" \n\t "),
            Err(ValidationError::EmptyInput)
        );
    }

    #[test]
    fn rejects_numeric_only() {
        assert_eq!(
            validator().validate("12345"),
            Err(ValidationError::NumericOnly)
        );
        assert_eq!(
            validator().validate("12 34 5"),
            Err(ValidationError::NumericOnly)
        );
    }

    #[test]
    fn digits_mixed_with_words_are_fine() {
        assert!(validator().validate("waxaan arkay 3 geel").is_ok());
    }

    #[test]
    fn rejects_emoji_regardless_of_other_content() {
        assert_eq!(
            validator().validate("Waa wanaagsan 😀"),
            Err(ValidationError::EmojiNotAllowed)
        );
        // Emoji wins over disallowed characters
        assert_eq!(
            validator().validate("漢字 😀"),
            Err(ValidationError::EmojiNotAllowed)
        );
    }

    #[test]
    fn rejects_dingbats_and_variation_selectors() {
        assert_eq!(
            validator().validate("haa ✂ maya"),
            Err(ValidationError::EmojiNotAllowed)
        );
        assert_eq!(
            validator().validate("haa \u{FE0F}"),
            Err(ValidationError::EmojiNotAllowed)
        );
    }

    #[test]
    fn disallowed_sample_lists_all_when_few() {
        let err = validator().validate("Waa 漢字 wanaagsan").unwrap_err();
        match &err {
            ValidationError::DisallowedCharacters(sample) => {
                assert!(sample.contains('漢'));
                assert!(sample.contains('字'));
                assert!(!sample.contains("..."));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("漢, 字"));
    }

    #[test]
    fn disallowed_sample_is_truncated_with_ellipsis() {
        let err = validator().validate("pvz; : @ # waa").unwrap_err();
        match err {
            ValidationError::DisallowedCharacters(sample) => {
                assert_eq!(sample, "p, v, z, ;, :...");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn disallowed_check_is_case_insensitive() {
        assert!(validator().validate("WAA WANAAGSAN").is_ok());
        assert_eq!(
            validator().validate("Pizza"),
            Err(ValidationError::DisallowedCharacters("P, z".to_string()))
        );
    }

    #[test]
    fn language_check_skipped_without_detector() {
        assert!(validator()
            .validate("this is clearly an english sentence")
            .is_ok());
    }

    #[test]
    fn language_check_rejects_confident_mismatch() {
        let err = english_detecting()
            .validate("this is clearly an english sentence")
            .unwrap_err();
        assert_eq!(err, ValidationError::NotTargetLanguage(LanguageCode::new("en")));
        assert_eq!(err.reason(), "NOT_TARGET_LANGUAGE");
    }

    #[test]
    fn short_input_bypasses_language_check() {
        // 4 words, 8 characters
        assert!(english_detecting().validate("a b cd e").is_ok());
        // 2 words, long
        assert!(english_detecting().validate("absolutely wonderful").is_ok());
    }

    #[test]
    fn target_language_passes() {
        let validator = InputValidator::default().with_detector(Arc::new(FixedDetector("so")));
        assert!(validator.validate("Waa maalin wanaagsan oo qorrax leh").is_ok());
    }

    #[test]
    fn unsure_detector_passes() {
        let validator = InputValidator::default().with_detector(Arc::new(UnsureDetector));
        assert!(validator.validate("this is clearly an english sentence").is_ok());
    }

    #[test]
    fn thresholds_are_configurable() {
        let config = ValidatorConfig {
            langid_min_words: 1,
            langid_min_chars: 1,
            ..Default::default()
        };
        let validator = InputValidator::new(config).with_detector(Arc::new(FixedDetector("en")));
        assert!(validator.validate("hello").is_err());
    }

    #[test]
    fn reason_codes() {
        assert_eq!(ValidationError::EmptyInput.reason(), "EMPTY_INPUT");
        assert_eq!(ValidationError::NumericOnly.reason(), "NUMERIC_ONLY");
        assert_eq!(ValidationError::EmojiNotAllowed.reason(), "EMOJI_NOT_ALLOWED");
        assert_eq!(
            ValidationError::DisallowedCharacters(String::new()).reason(),
            "DISALLOWED_CHARACTERS"
        );
    }
}
