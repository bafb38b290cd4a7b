//! API request and response models.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use somclass_core::TextCategory;

/// Request body for POST /classify.
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// The text to classify.
    pub text: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" when the model is loaded, "degraded" otherwise.
    pub status: String,
    pub model_loaded: bool,
    pub timestamp: DateTime<Local>,
}

/// Model metadata in GET /model.
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub endpoint: String,
    pub loaded: bool,
    pub accuracy: String,
    pub labels: Vec<TextCategory>,
    pub max_length: usize,
}

/// Response body for GET /model.
#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub model: ModelInfo,
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub model: String,
    pub version: String,
    pub endpoint: String,
}
