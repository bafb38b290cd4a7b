//! ONNX sequence classifier.
//!
//! Runs a fine-tuned SomBERTa poetry/prose model exported to ONNX. The model
//! directory holds `model.onnx` and `tokenizer.json`; the network takes
//! `input_ids` and `attention_mask` and returns `logits` of shape `[1, 2]`.

use std::path::{Path, PathBuf};

use super::{ClassProbabilities, EncodeOptions, SequenceClassifier};

/// File name of the ONNX graph inside a model directory.
pub const MODEL_FILE: &str = "model.onnx";

/// File name of the tokenizer inside a model directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Error types for model loading and inference.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Model file not found.
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    /// Tokenizer file not found.
    #[error("Tokenizer file not found: {0}")]
    TokenizerNotFound(String),

    /// ONNX runtime error.
    #[error("ONNX runtime error: {0}")]
    #[cfg(feature = "ml")]
    OrtError(#[from] ort::Error),

    /// Tokenizer error.
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    /// Inference error.
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// ML feature not enabled.
    #[error("ML feature not enabled - rebuild with --features ml")]
    MlNotEnabled,
}

#[cfg(feature = "ml")]
impl From<tokenizers::Error> for ModelError {
    fn from(e: tokenizers::Error) -> Self {
        ModelError::TokenizerError(e.to_string())
    }
}

/// Locations of the serialized model and tokenizer.
#[derive(Debug, Clone)]
pub struct SequenceModelConfig {
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Path to the tokenizer.json file.
    pub tokenizer_path: PathBuf,
    /// Tokenizer settings applied at load time.
    pub encode: EncodeOptions,
    /// Number of intra-op threads for the ONNX session.
    pub intra_threads: usize,
}

impl SequenceModelConfig {
    /// Points at `model.onnx` and `tokenizer.json` inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join(MODEL_FILE),
            tokenizer_path: dir.join(TOKENIZER_FILE),
            encode: EncodeOptions::default(),
            intra_threads: 1,
        }
    }

    /// Sets the tokenizer settings applied at load time.
    pub fn with_encode(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }
}

impl Default for SequenceModelConfig {
    fn default() -> Self {
        Self::from_dir("models/somberta")
    }
}

/// Checks that both model files exist.
fn check_files(config: &SequenceModelConfig) -> Result<(), ModelError> {
    if !config.model_path.exists() {
        return Err(ModelError::ModelNotFound(
            config.model_path.display().to_string(),
        ));
    }
    if !config.tokenizer_path.exists() {
        return Err(ModelError::TokenizerNotFound(
            config.tokenizer_path.display().to_string(),
        ));
    }
    Ok(())
}

/// Applies truncation and padding settings to a tokenizer.
///
/// Truncation goes through the tokenizer so special tokens survive it.
#[cfg(feature = "ml")]
fn configure_tokenizer(
    tokenizer: &mut tokenizers::Tokenizer,
    options: &EncodeOptions,
) -> Result<(), ModelError> {
    use tokenizers::{PaddingParams, TruncationParams};

    let truncation = options.truncation.then(|| TruncationParams {
        max_length: options.max_length,
        ..Default::default()
    });
    tokenizer.with_truncation(truncation)?;
    tokenizer.with_padding(options.padding.then(PaddingParams::default));
    Ok(())
}

/// Tokenizes `text` into `input_ids` and `attention_mask`.
#[cfg(feature = "ml")]
fn encode_with(
    tokenizer: &tokenizers::Tokenizer,
    text: &str,
) -> Result<(Vec<i64>, Vec<i64>), ModelError> {
    let encoding = tokenizer.encode(text, true)?;

    let input_ids = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();

    Ok((input_ids, attention_mask))
}

/// ONNX-backed two-class sequence classifier.
#[cfg(feature = "ml")]
pub struct OnnxSequenceClassifier {
    /// `Session::run` needs exclusive access.
    session: std::sync::Mutex<ort::session::Session>,
    tokenizer: tokenizers::Tokenizer,
    /// Settings `tokenizer` was configured with.
    encode: EncodeOptions,
}

#[cfg(feature = "ml")]
impl OnnxSequenceClassifier {
    /// Loads the ONNX model and tokenizer.
    ///
    /// Returns an error if the model or tokenizer files are not found.
    pub fn new(config: SequenceModelConfig) -> Result<Self, ModelError> {
        use ort::session::{builder::GraphOptimizationLevel, Session};

        check_files(&config)?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.intra_threads)?
            .commit_from_file(&config.model_path)?;

        let mut tokenizer = tokenizers::Tokenizer::from_file(&config.tokenizer_path)?;
        configure_tokenizer(&mut tokenizer, &config.encode)?;

        Ok(Self {
            session: std::sync::Mutex::new(session),
            tokenizer,
            encode: config.encode,
        })
    }

    /// Loads the classifier from a model directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::new(SequenceModelConfig::from_dir(dir))
    }

    /// Tokenizes `text` with `options`.
    ///
    /// Options other than the load-time ones reconfigure a copy of the
    /// tokenizer for this call.
    fn encode(
        &self,
        text: &str,
        options: &EncodeOptions,
    ) -> Result<(Vec<i64>, Vec<i64>), ModelError> {
        if *options == self.encode {
            return encode_with(&self.tokenizer, text);
        }

        tracing::debug!(?options, "Encoding with per-call tokenizer settings");
        let mut tokenizer = self.tokenizer.clone();
        configure_tokenizer(&mut tokenizer, options)?;
        encode_with(&tokenizer, text)
    }
}

#[cfg(feature = "ml")]
impl SequenceClassifier for OnnxSequenceClassifier {
    fn predict(
        &self,
        text: &str,
        options: &EncodeOptions,
    ) -> Result<ClassProbabilities, ModelError> {
        use ort::value::Tensor;

        let (input_ids, attention_mask) = self.encode(text, options)?;
        let seq_len = input_ids.len();
        if seq_len == 0 {
            return Err(ModelError::InferenceError(
                "tokenizer produced no tokens".to_string(),
            ));
        }

        // Shape [1, seq_len]
        let input_ids_tensor = Tensor::from_array(([1, seq_len], input_ids.into_boxed_slice()))?;
        let attention_mask_tensor =
            Tensor::from_array(([1, seq_len], attention_mask.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::InferenceError("session lock poisoned".to_string()))?;

        let outputs = session.run(ort::inputs![
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor
        ])?;

        let logits_tensor = outputs["logits"].try_extract_tensor::<f32>().map_err(|e| {
            ModelError::InferenceError(format!("Failed to extract logits: {}", e))
        })?;

        let shape = logits_tensor.0;
        let logits_data = logits_tensor.1;

        // Verify shape is [1, 2]
        let dims: Vec<_> = shape.iter().collect();
        if dims.len() != 2 || *dims[0] != 1 || *dims[1] != 2 {
            return Err(ModelError::InferenceError(format!(
                "Unexpected output shape: {:?}",
                dims
            )));
        }

        Ok(ClassProbabilities::from_logits(logits_data[0], logits_data[1]))
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

/// Stub classifier when ML feature is not enabled.
///
/// Construction always fails.
#[cfg(not(feature = "ml"))]
pub struct OnnxSequenceClassifier {
    _config: SequenceModelConfig,
}

#[cfg(not(feature = "ml"))]
impl OnnxSequenceClassifier {
    /// Always fails: the ONNX runtime is not compiled in.
    ///
    /// Missing files are still reported first so misconfiguration shows up
    /// the same way in both builds.
    pub fn new(config: SequenceModelConfig) -> Result<Self, ModelError> {
        check_files(&config)?;
        Err(ModelError::MlNotEnabled)
    }

    /// Loads the classifier from a model directory (ML feature not enabled).
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::new(SequenceModelConfig::from_dir(dir))
    }
}

#[cfg(not(feature = "ml"))]
impl SequenceClassifier for OnnxSequenceClassifier {
    fn predict(
        &self,
        _text: &str,
        _options: &EncodeOptions,
    ) -> Result<ClassProbabilities, ModelError> {
        Err(ModelError::MlNotEnabled)
    }

    fn name(&self) -> &'static str {
        "onnx-disabled"
    }
}
