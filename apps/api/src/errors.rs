use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::error::ExtractionError;
use crate::extraction::models::ParseResponse;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Too many documents are being parsed; retry shortly")]
    Busy,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Extraction(e) => {
                let status = match e {
                    ExtractionError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    e if e.is_client_error() => StatusCode::BAD_REQUEST,
                    e => {
                        tracing::error!("Extraction error: {e}");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                return (status, Json(ParseResponse::failure(e))).into_response();
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE", msg.clone())
            }
            AppError::Busy => (
                StatusCode::SERVICE_UNAVAILABLE,
                "BUSY",
                "The parser is at capacity. Please retry shortly".to_string(),
            ),
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
            "success": false,
            "error": message,
            "errorCode": code
        }));

        (status, body).into_response()
    }
}
