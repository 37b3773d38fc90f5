/*
 * Responsibility
 * - Common ApiError for handlers (the gate has its own rejection shape)
 * - IntoResponse implementation (HTTP status / JSON error body)
 * - Unify issuer / revocation errors into it
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::revocation::RevocationError;
use crate::services::token::IssueError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<IssueError> for AppError {
    fn from(e: IssueError) -> Self {
        match e {
            IssueError::EmptySubject => AppError::bad_request("INVALID_REQUEST", e.to_string()),
            IssueError::Codec(err) => {
                tracing::error!(error = %err, "token issuance failed");
                AppError::Internal
            }
        }
    }
}

impl From<RevocationError> for AppError {
    fn from(e: RevocationError) -> Self {
        tracing::error!(error = %e, "token revocation failed");
        AppError::Internal
    }
}
