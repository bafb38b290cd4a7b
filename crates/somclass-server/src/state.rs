//! Application state for the API server.

use std::sync::Arc;

use somclass_core::{ClassificationPipeline, ModelHandle};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Validation, normalization and inference.
    pub pipeline: Arc<ClassificationPipeline>,
}

impl AppState {
    /// Creates application state around a pipeline.
    pub fn new(pipeline: ClassificationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Creates application state with default settings over a model handle.
    pub fn with_model(model: Arc<ModelHandle>) -> Self {
        Self::new(ClassificationPipeline::with_defaults(model))
    }

    /// Creates application state with no model loaded (degraded mode).
    pub fn without_model() -> Self {
        Self::with_model(Arc::new(ModelHandle::empty()))
    }

    /// Returns the shared model handle.
    pub fn model(&self) -> &Arc<ModelHandle> {
        self.pipeline.model()
    }
}
