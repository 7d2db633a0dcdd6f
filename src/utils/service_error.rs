// ZDB-41: HTTP-facing error type for the session API
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::scan_orchestrator::ScanError;
use crate::services::session::SessionError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Session not found")]
    SessionNotFound,

    #[error("No report available")]
    NoReport,

    #[error("Summarizer unavailable: {0}")]
    SummarizerUnavailable(String),

    #[error("Session capacity reached")]
    SessionCapacity,

    #[error("Internal server error")]
    InternalError,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServiceError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ServiceError::SessionNotFound => {
                (StatusCode::NOT_FOUND, "Session not found".to_string())
            },
            ServiceError::NoReport => (
                StatusCode::NOT_FOUND,
                "No scan has completed in this session yet".to_string(),
            ),
            ServiceError::SummarizerUnavailable(msg) => (StatusCode::BAD_GATEWAY, msg),
            ServiceError::SessionCapacity => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Too many active sessions, try again later".to_string(),
            ),
            ServiceError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(error: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(error.to_string())
    }
}

impl From<SessionError> for ServiceError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::CapacityReached(_) => ServiceError::SessionCapacity,
        }
    }
}

impl From<ScanError> for ServiceError {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::Summarizer(e) => ServiceError::SummarizerUnavailable(e.to_string()),
            ScanError::InvalidInput(msg) => ServiceError::ValidationError(msg),
            ScanError::Panicked(_) => ServiceError::InternalError,
        }
    }
}
