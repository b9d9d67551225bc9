use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing text")]
    MissingText,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No audio generated")]
    NoAudioGenerated,

    /// Pipeline, encoding or I/O failure; the message reaches the client as is.
    #[error("{0:#}")]
    Synthesis(#[from] anyhow::Error),

    #[error("{0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingText | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NoAudioGenerated | ApiError::Synthesis(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Log prefix for server-side failures, `None` for client errors.
    fn log_label(&self) -> Option<&'static str> {
        match self {
            ApiError::NoAudioGenerated | ApiError::Synthesis(_) => Some("TTS error"),
            ApiError::Internal(_) => Some("Internal error"),
            ApiError::MissingText | ApiError::InvalidInput(_) | ApiError::NotFound => None,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.to_string();

        if let Some(label) = self.log_label() {
            tracing::error!("{}: {}", label, error_message);
        }

        let body = Json(ErrorResponse {
            error: error_message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
