//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use somclass_core::{ClassifyError, ValidationError};

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected by the validator.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Model not loaded.
    #[error("{0}")]
    ModelUnavailable(String),

    /// Model call failed.
    #[error("{0}")]
    InferenceFailure(String),

    /// Bad request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ClassifyError> for ApiError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::Validation(v) => ApiError::Validation(v),
            e @ ClassifyError::ModelUnavailable(_) => ApiError::ModelUnavailable(e.to_string()),
            e @ ClassifyError::InferenceFailure(..) => ApiError::InferenceFailure(e.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    /// Returns the HTTP status and machine-readable code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(v) => (StatusCode::BAD_REQUEST, validation_code(v)),
            ApiError::ModelUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "model_unavailable"),
            ApiError::InferenceFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "inference_failure")
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

fn validation_code(e: &ValidationError) -> &'static str {
    match e {
        ValidationError::EmptyInput => "empty_input",
        ValidationError::NumericOnly => "numeric_only",
        ValidationError::EmojiNotAllowed => "emoji_not_allowed",
        ValidationError::DisallowedCharacters(_) => "disallowed_characters",
        ValidationError::NotTargetLanguage(_) => "not_target_language",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        let err = ApiError::from(ValidationError::NumericOnly);
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "numeric_only")
        );
    }

    #[test]
    fn classify_errors_map_to_statuses() {
        let err = ApiError::from(ClassifyError::ModelUnavailable("SomBERTa".to_string()));
        assert_eq!(err.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "SomBERTa model not loaded");

        let err = ApiError::from(ClassifyError::InferenceFailure(
            "SomBERTa".to_string(),
            "bad shape".to_string(),
        ));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("bad shape"));
    }
}
