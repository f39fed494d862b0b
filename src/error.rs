// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required caller input is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// Server credentials are not configured.
    #[error("{0}")]
    Configuration(String),

    /// No bearer token was presented.
    #[error("{0}")]
    Unauthorized(String),

    /// Strava could not be reached, even after retrying.
    #[error("{0}")]
    Transport(String),

    /// Strava answered with a non-2xx status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Strava answered with a non-2xx status and a JSON body that is relayed as-is.
    #[error("Strava API error: {status}")]
    UpstreamBody {
        status: u16,
        body: serde_json::Value,
    },

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const NO_ACCESS_TOKEN: &'static str = "No access token provided";

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Configuration(_) | AppError::Transport(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream { status, .. } | AppError::UpstreamBody { status, .. } => {
                upstream_status(*status)
            }
        }
    }
}

/// Map an upstream status onto ours, falling back to 500 for values axum
/// cannot represent.
fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::UpstreamBody { body, .. } => (status, Json(body)).into_response(),
            other => {
                if status.is_server_error() {
                    tracing::error!(status = status.as_u16(), error = %other, "Request failed");
                } else {
                    tracing::warn!(status = status.as_u16(), error = %other, "Request rejected");
                }
                let body = ErrorResponse {
                    error: other.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
