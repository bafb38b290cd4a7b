//! Model-facing side of the pipeline.
//!
//! The network itself is opaque: anything implementing
//! [`SequenceClassifier`] can serve predictions. [`OnnxSequenceClassifier`]
//! is the production implementation; [`ModelHandle`] owns whichever one was
//! loaded at startup.

mod category;
mod handle;
mod sequence;

pub use category::{ClassProbabilities, ClassificationResult, TextCategory};
pub use handle::ModelHandle;
pub use sequence::{
    ModelError, OnnxSequenceClassifier, SequenceModelConfig, MODEL_FILE, TOKENIZER_FILE,
};

use std::path::Path;
use std::sync::Arc;

/// Tokenization settings passed with every inference call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Maximum sequence length (tokens).
    pub max_length: usize,
    /// Cut sequences longer than `max_length`.
    pub truncation: bool,
    /// Pad sequences to the longest in the batch.
    pub padding: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_length: 512,
            truncation: true,
            padding: true,
        }
    }
}

/// A two-class text classifier.
///
/// Implementations must be safe to call from several threads at once.
pub trait SequenceClassifier: Send + Sync {
    /// Returns the class probabilities for `text`.
    fn predict(
        &self,
        text: &str,
        options: &EncodeOptions,
    ) -> Result<ClassProbabilities, ModelError>;

    /// Returns the name of this classifier for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Loads the ONNX classifier from a model directory, with its tokenizer
/// configured for `encode`.
pub fn load_model(
    dir: impl AsRef<Path>,
    encode: EncodeOptions,
) -> Result<Arc<dyn SequenceClassifier>, ModelError> {
    let config = SequenceModelConfig::from_dir(dir).with_encode(encode);
    let classifier = OnnxSequenceClassifier::new(config)?;
    Ok(Arc::new(classifier))
}
