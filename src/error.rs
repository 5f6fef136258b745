// Error handling module
// Defines error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API errors that can occur during request processing
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with existing state
    #[error("{0}")]
    BadRequest(String),

    /// Credentials rejected
    #[error("{0}")]
    Unauthorized(String),

    /// Request validation error
    #[error("{0}")]
    Validation(String),

    /// The symptom checker was called without an OpenAI key
    #[error("OpenAI API key not configured on the server")]
    OpenAiNotConfigured,

    /// Error from the OpenAI API
    #[error("OpenAI API error: {status} - {message}")]
    OpenAi { status: u16, message: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::OpenAiNotConfigured
            | ApiError::OpenAi { .. }
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                return internal_error_response();
            }
            other => Json(json!({ "detail": other.to_string() })),
        };

        (status, body).into_response()
    }
}

/// Body returned for unexpected failures, including handler panics
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "detail": "Internal server error",
            "message": "An unexpected error occurred. Please try again later.",
            "timestamp": crate::utils::now_iso(),
        })),
    )
        .into_response()
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
