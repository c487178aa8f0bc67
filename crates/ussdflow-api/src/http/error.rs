//! Application error type mapping to HTTP status codes and the JSON envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use ussdflow_types::error::{ErrorKind, FlowError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure inside the state machine or its collaborators.
    Flow(FlowError),
    NotFound(String),
    /// Malformed request.
    Validation(String),
    Internal(String),
}

impl From<FlowError> for AppError {
    fn from(e: FlowError) -> Self {
        AppError::Flow(e)
    }
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Flow(e) => match e.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, "INVALID_SELECTION"),
                ErrorKind::Contract => (StatusCode::INTERNAL_SERVER_ERROR, "CONTRACT_VIOLATION"),
                ErrorKind::Collaborator => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            },
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            // Store and cipher details stay in the logs.
            AppError::Flow(e) if e.kind() == ErrorKind::Collaborator => {
                tracing::warn!(error = %e, "request failed");
                "Service temporarily unavailable".to_string()
            }
            AppError::Flow(e) => e.to_string(),
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::Internal(msg) => {
                msg.clone()
            }
        };

        let request_id = uuid::Uuid::now_v7().to_string();
        ApiResponse::error(code, &message, request_id).into_response_with(status)
    }
}
