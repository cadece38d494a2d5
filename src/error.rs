use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Spec unavailable: {0}")]
    SpecUnavailable(String),

    #[error("Embedding provider returned no vectors")]
    NoEmbeddings,

    #[error("Embedding provider failed: {0}")]
    EmbeddingProvider(String),

    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::SpecUnavailable(msg) => {
                tracing::warn!(error = %msg, "Spec unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "tool retrieval is currently unavailable".to_string(),
                )
            }
            AppError::NoEmbeddings | AppError::EmbeddingProvider(_) => {
                // Provider-specific detail stays in the logs, never in the body.
                tracing::error!(error = %self, "Embedding provider error");
                (
                    StatusCode::BAD_GATEWAY,
                    "could not find a relevant tool".to_string(),
                )
            }
            AppError::IndexUnavailable(msg) => {
                tracing::error!(error = %msg, "Vector index error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "tool retrieval is currently unavailable".to_string(),
                )
            }
            AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
