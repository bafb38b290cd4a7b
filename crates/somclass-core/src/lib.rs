//! Somclass Core - validation, normalization and classification of Somali text.
//!
//! This crate holds everything between raw user input and the poetry/prose
//! model:
//!
//! - [`validator`] rejects malformed input with a specific reason
//! - [`normalizer`] canonicalizes accepted input before tokenization
//! - [`classifier`] wraps the ONNX model behind [`classifier::SequenceClassifier`]
//! - [`pipeline`] chains the three and measures timing
//!
//! ## Example
//!
//! ```
//! use somclass_core::normalizer::normalize;
//! use somclass_core::validator::{InputValidator, ValidationError};
//!
//! let validator = InputValidator::default();
//! assert_eq!(validator.validate("12345"), Err(ValidationError::NumericOnly));
//!
//! assert_eq!(normalize("Waa wanaagsan. Waa wanaagsan.").as_str(), "waa wanaagsan.");
//! ```

pub mod classifier;
pub mod language;
pub mod normalizer;
pub mod pipeline;
pub mod policy;
pub mod validator;

pub use classifier::{ClassificationResult, ModelHandle, SequenceClassifier, TextCategory};
pub use pipeline::{ClassificationPipeline, ClassifyError, PipelineConfig};
pub use validator::{InputValidator, ValidationError, ValidatorConfig};
