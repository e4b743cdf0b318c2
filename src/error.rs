use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    /// Map a reqwest failure into the taxonomy: deadline expiry is a timeout,
    /// anything else counts as the upstream being unavailable.
    pub fn from_reqwest(source: &str, e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::UpstreamTimeout(format!("{} request timed out", source))
        } else {
            AppError::Upstream(format!("{} request failed: {}", source, e))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::UpstreamTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Upstream(msg) => {
                error!("upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
