//! Classification pipeline.
//!
//! Every request walks the same path:
//!
//! ```text
//! RECEIVED -> VALIDATING -> REJECTED
//!                        -> NORMALIZING -> SHORT_CIRCUIT_INSUFFICIENT -> RESULT_READY
//!                                       -> INFERRING                  -> RESULT_READY
//! ```
//!
//! Inputs that normalize to too little content skip the model entirely.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::classifier::{ClassificationResult, EncodeOptions, ModelHandle, TextCategory};
use crate::normalizer::{NormalizedText, TextNormalizer};
use crate::validator::{InputValidator, ValidationError};

/// Stages a request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validating,
    Rejected,
    Normalizing,
    ShortCircuitInsufficient,
    Inferring,
    ResultReady,
}

/// Why a classification attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// Input rejected by the validator.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No model was loaded at startup.
    #[error("{0} model not loaded")]
    ModelUnavailable(String),

    /// The model call failed.
    #[error("{0} classification error: {1}")]
    InferenceFailure(String, String),
}

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Normalized texts shorter than this skip inference.
    pub min_chars: usize,
    /// Normalized texts with fewer words skip inference.
    pub min_words: usize,
    /// Tokenization settings for the model call.
    pub encode: EncodeOptions,
    /// Model identifier reported in results.
    pub model_name: String,
    /// Accuracy descriptor reported in results.
    pub accuracy: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_chars: 30,
            min_words: 5,
            encode: EncodeOptions::default(),
            model_name: "SomBERTa".to_string(),
            accuracy: "94.8%".to_string(),
        }
    }
}

/// Validate, normalize, classify.
pub struct ClassificationPipeline {
    validator: InputValidator,
    normalizer: TextNormalizer,
    model: Arc<ModelHandle>,
    config: PipelineConfig,
}

impl ClassificationPipeline {
    /// Creates a pipeline over a shared model handle.
    pub fn new(validator: InputValidator, model: Arc<ModelHandle>, config: PipelineConfig) -> Self {
        Self {
            validator,
            normalizer: TextNormalizer::new(),
            model,
            config,
        }
    }

    /// Creates a pipeline with default validator and thresholds.
    pub fn with_defaults(model: Arc<ModelHandle>) -> Self {
        Self::new(InputValidator::default(), model, PipelineConfig::default())
    }

    /// Returns the shared model handle.
    pub fn model(&self) -> &Arc<ModelHandle> {
        &self.model
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the validator.
    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }

    /// Classifies raw input.
    ///
    /// Fails with [`ClassifyError::ModelUnavailable`] before looking at the
    /// input when no model is installed. Blocks for the duration of the
    /// model call.
    pub fn classify(&self, raw: &str) -> Result<ClassificationResult, ClassifyError> {
        let start = Instant::now();
        trace_stage(PipelineStage::Received);

        let Some(model) = self.model.get() else {
            return Err(ClassifyError::ModelUnavailable(self.config.model_name.clone()));
        };

        trace_stage(PipelineStage::Validating);
        if let Err(e) = self.validator.validate(raw) {
            trace_stage(PipelineStage::Rejected);
            return Err(e.into());
        }

        trace_stage(PipelineStage::Normalizing);
        let text = self.normalizer.normalize(raw);

        if self.is_insufficient(&text) {
            trace_stage(PipelineStage::ShortCircuitInsufficient);
            debug!(
                chars = text.char_count(),
                words = text.word_count(),
                "Skipping inference on insufficient input"
            );
            return Ok(self.finish(TextCategory::InsufficientInput, 0.0, start));
        }

        trace_stage(PipelineStage::Inferring);
        let probabilities = model
            .predict(text.as_str(), &self.config.encode)
            .map_err(|e| {
                error!(classifier = model.name(), error = %e, "Inference failed");
                ClassifyError::InferenceFailure(self.config.model_name.clone(), e.to_string())
            })?;

        let (index, confidence) = probabilities.best();
        let category = TextCategory::from_index(index).ok_or_else(|| {
            ClassifyError::InferenceFailure(
                self.config.model_name.clone(),
                format!("unknown class index {}", index),
            )
        })?;

        Ok(self.finish(category, confidence, start))
    }

    /// Returns true if the normalized text is too short to classify.
    pub fn is_insufficient(&self, text: &NormalizedText) -> bool {
        text.char_count() < self.config.min_chars || text.word_count() < self.config.min_words
    }

    fn finish(
        &self,
        category: TextCategory,
        confidence: f32,
        start: Instant,
    ) -> ClassificationResult {
        let processing_time = start.elapsed().as_secs_f64();
        trace_stage(PipelineStage::ResultReady);

        info!(
            category = category.label(),
            confidence,
            processing_time,
            "Classification complete"
        );

        ClassificationResult {
            model: self.config.model_name.clone(),
            category,
            confidence,
            processing_time,
            accuracy: self.config.accuracy.clone(),
            speed: format!("{:.2}s", processing_time),
        }
    }
}

fn trace_stage(stage: PipelineStage) {
    debug!(?stage, "Pipeline stage");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::classifier::{ClassProbabilities, ModelError, SequenceClassifier};

    const POEM: &str = "Gabaygan waxaa tiriyey abwaan caan ah oo reer miyi ah";

    /// Returns fixed probabilities and counts calls.
    struct CountingClassifier {
        calls: AtomicUsize,
        probabilities: ClassProbabilities,
        last_options: std::sync::Mutex<Option<EncodeOptions>>,
    }

    impl CountingClassifier {
        fn new(prose: f32, poetry: f32) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                probabilities: ClassProbabilities::new(prose, poetry),
                last_options: std::sync::Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SequenceClassifier for CountingClassifier {
        fn predict(
            &self,
            _text: &str,
            options: &EncodeOptions,
        ) -> Result<ClassProbabilities, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_options.lock().unwrap() = Some(*options);
            Ok(self.probabilities)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct FailingClassifier;

    impl SequenceClassifier for FailingClassifier {
        fn predict(
            &self,
            _text: &str,
            _options: &EncodeOptions,
        ) -> Result<ClassProbabilities, ModelError> {
            Err(ModelError::InferenceError("boom".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn pipeline_with(model: Arc<dyn SequenceClassifier>) -> ClassificationPipeline {
        ClassificationPipeline::with_defaults(Arc::new(ModelHandle::ready(model)))
    }

    #[test]
    fn classifies_poetry() {
        let model = CountingClassifier::new(0.1, 0.9);
        let pipeline = pipeline_with(model.clone());

        let result = pipeline.classify(POEM).unwrap();
        assert_eq!(result.category, TextCategory::Poetry);
        assert!((result.confidence - 0.9).abs() < 1e-6);
        assert_eq!(result.model, "SomBERTa");
        assert_eq!(result.accuracy, "94.8%");
        assert!(result.speed.ends_with('s'));
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn classifies_prose() {
        let model = CountingClassifier::new(0.8, 0.2);
        let result = pipeline_with(model).classify(POEM).unwrap();
        assert_eq!(result.category, TextCategory::Prose);
        assert!((result.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn passes_encode_options_to_model() {
        let model = CountingClassifier::new(0.1, 0.9);
        pipeline_with(model.clone()).classify(POEM).unwrap();
        let options = model.last_options.lock().unwrap().unwrap();
        assert_eq!(options.max_length, 512);
        assert!(options.truncation);
        assert!(options.padding);
    }

    #[test]
    fn insufficient_input_skips_inference() {
        let model = CountingClassifier::new(0.1, 0.9);
        let pipeline = pipeline_with(model.clone());

        // 3 words, 15 characters
        let result = pipeline.classify("waa maalin roob").unwrap();
        assert_eq!(result.category, TextCategory::InsufficientInput);
        assert_eq!(result.confidence, 0.0);
        assert!(result.processing_time >= 0.0);
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn many_short_words_are_insufficient_by_length() {
        let model = CountingClassifier::new(0.1, 0.9);
        let pipeline = pipeline_with(model.clone());
        let result = pipeline.classify("a b c d e f g h").unwrap();
        assert_eq!(result.category, TextCategory::InsufficientInput);
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn guard_applies_after_normalization() {
        let model = CountingClassifier::new(0.1, 0.9);
        let pipeline = pipeline_with(model.clone());
        // Long raw input that collapses to a single sentence of 2 words
        let raw = "Haa haa. Haa haa. Haa haa. Haa haa. Haa haa. Haa haa.";
        let result = pipeline.classify(raw).unwrap();
        assert_eq!(result.category, TextCategory::InsufficientInput);
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn validation_failure_stops_pipeline() {
        let model = CountingClassifier::new(0.1, 0.9);
        let pipeline = pipeline_with(model.clone());

        let err = pipeline.classify("12345").unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Validation(ValidationError::NumericOnly)
        ));
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn missing_model_fails_regardless_of_input() {
        let pipeline = ClassificationPipeline::with_defaults(Arc::new(ModelHandle::empty()));

        assert!(matches!(
            pipeline.classify(POEM),
            Err(ClassifyError::ModelUnavailable(_))
        ));
        assert!(matches!(
            pipeline.classify(""),
            Err(ClassifyError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn inference_error_is_wrapped() {
        let pipeline = pipeline_with(Arc::new(FailingClassifier));
        match pipeline.classify(POEM) {
            Err(ClassifyError::InferenceFailure(model, cause)) => {
                assert_eq!(model, "SomBERTa");
                assert!(cause.contains("boom"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn thresholds_are_configurable() {
        let model = CountingClassifier::new(0.1, 0.9);
        let config = PipelineConfig {
            min_chars: 1,
            min_words: 1,
            ..Default::default()
        };
        let pipeline = ClassificationPipeline::new(
            InputValidator::default(),
            Arc::new(ModelHandle::ready(model.clone())),
            config,
        );
        let result = pipeline.classify("haa").unwrap();
        assert_eq!(result.category, TextCategory::Poetry);
        assert_eq!(model.calls(), 1);
    }
}
