//! Language identification seam.
//!
//! The validator consults an optional [`LanguageDetector`]. Running without a
//! detector is a supported configuration: the language check then passes.
//! With the `langid` feature, [`LinguaDetector`] provides a statistical
//! detector backed by the `lingua` crate.

use std::fmt;

/// ISO 639-1 language code, lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Creates a code, normalizing it to lowercase.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_lowercase())
    }

    /// The Somali language code.
    pub fn somali() -> Self {
        Self::new("so")
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies the natural language of a text.
pub trait LanguageDetector: Send + Sync {
    /// Returns the detected language, or `None` when the detector is not
    /// confident enough to name one.
    fn detect(&self, text: &str) -> Option<LanguageCode>;

    /// Returns the name of this detector for logging.
    fn name(&self) -> &'static str;
}

#[cfg(feature = "langid")]
pub use self::lingua_detector::LinguaDetector;

#[cfg(feature = "langid")]
mod lingua_detector {
    use lingua::{Language, LanguageDetectorBuilder};

    use super::{LanguageCode, LanguageDetector};

    /// Minimum distance between the best and second-best candidate before a
    /// detection counts as confident.
    const DEFAULT_MIN_RELATIVE_DISTANCE: f64 = 0.25;

    /// Statistical detector backed by `lingua`.
    pub struct LinguaDetector {
        inner: lingua::LanguageDetector,
    }

    impl LinguaDetector {
        /// Builds a detector over all languages known to `lingua`.
        pub fn new() -> Self {
            Self::with_min_relative_distance(DEFAULT_MIN_RELATIVE_DISTANCE)
        }

        /// Builds a detector with a custom confidence distance (0.0 to 0.99).
        pub fn with_min_relative_distance(distance: f64) -> Self {
            let inner = LanguageDetectorBuilder::from_all_languages()
                .with_minimum_relative_distance(distance.clamp(0.0, 0.99))
                .build();
            Self { inner }
        }
    }

    impl Default for LinguaDetector {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LanguageDetector for LinguaDetector {
        fn detect(&self, text: &str) -> Option<LanguageCode> {
            let language: Language = self.inner.detect_language_of(text)?;
            Some(LanguageCode::new(language.iso_code_639_1().to_string()))
        }

        fn name(&self) -> &'static str {
            "lingua"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_code_is_lowercase() {
        assert_eq!(LanguageCode::new(" SO ").as_str(), "so");
        assert_eq!(LanguageCode::new("SO"), LanguageCode::somali());
        assert_eq!(LanguageCode::somali().to_string(), "so");
    }
}
