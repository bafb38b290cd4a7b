//! API route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{debug, error, info, warn};

use somclass_core::{ClassificationResult, TextCategory};

use crate::error::{ApiError, Result};
use crate::models::{ClassifyRequest, HealthResponse, ModelInfo, ModelResponse, RootResponse};
use crate::state::AppState;
use crate::CLASSIFY_PATH;

/// POST /classify - Validate, normalize and classify a text.
pub async fn classify(
    State(state): State<AppState>,
    body: std::result::Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassificationResult>> {
    let Json(req) = body.map_err(|rejection| {
        debug!(status = %rejection.status(), "Malformed classify request");
        ApiError::BadRequest(rejection.body_text())
    })?;
    debug!(text_len = req.text.len(), "Classifying text");

    // Model inference blocks; keep it off the async workers
    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.classify(&req.text))
        .await
        .map_err(|e| {
            error!("Classification task failed: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    match outcome {
        Ok(result) => {
            info!(
                category = result.category.label(),
                confidence = result.confidence,
                processing_time = result.processing_time,
                "Text classified"
            );
            Ok(Json(result))
        }
        Err(e) => {
            let err = ApiError::from(e);
            match &err {
                ApiError::Validation(v) => debug!(reason = v.reason(), "Rejected input"),
                ApiError::ModelUnavailable(_) => warn!("Classification requested without a model"),
                other => error!("Classification failed: {}", other),
            }
            Err(err)
        }
    }
}

/// GET /health - Report whether the model is loaded.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.model().is_ready();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" }.to_string(),
        model_loaded,
        timestamp: chrono::Local::now(),
    })
}

/// GET /model - Static model metadata.
pub async fn model_info(State(state): State<AppState>) -> Json<ModelResponse> {
    let config = state.pipeline.config();

    Json(ModelResponse {
        model: ModelInfo {
            name: config.model_name.clone(),
            endpoint: CLASSIFY_PATH.to_string(),
            loaded: state.model().is_ready(),
            accuracy: config.accuracy.clone(),
            labels: TextCategory::model_classes().to_vec(),
            max_length: config.encode.max_length,
        },
    })
}

/// GET / - Service banner.
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let model = state.pipeline.config().model_name.clone();

    Json(RootResponse {
        message: format!("Somali Text AI Classifier - {} Model", model),
        model,
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoint: CLASSIFY_PATH.to_string(),
    })
}
