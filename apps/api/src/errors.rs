use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::{supported_extensions, ExtractError, MAX_UPLOAD_LABEL};
use crate::llm_client::InferenceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("File exceeds the upload size limit")]
    PayloadTooLarge,

    #[error("Extraction error: {0}")]
    Extraction(ExtractError),

    #[error("Ollama service is not available")]
    ServiceUnavailable,

    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFormat { filename, .. } => AppError::UnsupportedFormat(filename),
            other => AppError::Extraction(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFormat(_) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                format!(
                    "Unsupported file type. Supported types: {}",
                    supported_extensions().join(", ")
                ),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::BAD_REQUEST,
                "FILE_TOO_LARGE",
                format!("File size too large. Maximum size is {MAX_UPLOAD_LABEL}."),
            ),
            AppError::Extraction(e) => {
                tracing::error!("Extraction error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    format!("Failed to parse file: {e}"),
                )
            }
            AppError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Ollama service is not available".to_string(),
            ),
            AppError::MalformedModelOutput(msg) => {
                tracing::error!("Malformed model output: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_MODEL_OUTPUT",
                    "Invalid response from AI service".to_string(),
                )
            }
            AppError::Inference(e) => {
                tracing::error!("Inference error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INFERENCE_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
