//! Error types and handling for the iFlow proxy server.
//!
//! Every failure is reported to the caller with the same envelope:
//! `{"error": {"message", "type": "invalid_request_error", "code"}}`.
//! The HTTP status (and `code`) mirrors the upstream status when one was
//! received, otherwise it is 500.

use crate::core::error_types::{ErrorCategoryCode, ERROR_TYPE_INVALID_REQUEST};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Transport failure talking to the upstream (connect, timeout, body read)
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Request failed with status code {status}")]
    UpstreamStatus { status: u16 },

    /// Inbound body could not be decoded as JSON
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Request(e) => e
                .status()
                .and_then(|status| StatusCode::from_u16(status.as_u16()).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::UpstreamStatus { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failure category for metrics labels.
    pub fn category(&self) -> ErrorCategoryCode {
        match self {
            AppError::Request(e) if e.is_timeout() => ErrorCategoryCode::Timeout,
            AppError::Request(e) if e.is_connect() => ErrorCategoryCode::ConnectError,
            AppError::Request(e) => match e.status() {
                Some(status) => ErrorCategoryCode::from_upstream_status(status.as_u16()),
                None => ErrorCategoryCode::NetworkError,
            },
            AppError::UpstreamStatus { status } => {
                ErrorCategoryCode::from_upstream_status(*status)
            }
            AppError::InvalidBody(_) => ErrorCategoryCode::InvalidBody,
            AppError::Config(_) | AppError::Internal(_) => ErrorCategoryCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": ERROR_TYPE_INVALID_REQUEST,
                "code": status.as_u16()
            }
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
