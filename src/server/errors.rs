use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::RelayError;

/// Errors returned by the HTTP handlers
pub enum AppError {
    /// Input rejected before the resolver runs
    Validation(RelayError),
    /// Resolver failures, surfaced with their message
    Relay(RelayError),
    /// Generic internal server errors
    Internal(anyhow::Error),
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            err @ RelayError::InvalidUrl(_) => AppError::Validation(err),
            other => AppError::Relay(other),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(err) => {
                if let RelayError::InvalidUrl(input) = &err {
                    debug!("Rejected resolve input: {:?}", input);
                }
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": err.to_string() })),
                )
                    .into_response()
            }
            AppError::Relay(err) => {
                warn!("Resolve failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "ok": false, "error": err.to_string() })),
                )
                    .into_response()
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "ok": false, "error": err.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
