/*
 * Responsibility
 * - Failure taxonomy of the token gate
 * - JSON rejection body `{ "error": true, "message": ..., "code": ... }`
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Why a request was refused by the gate.
///
/// Messages are part of the client contract: clients tell "expired"
/// (refresh and retry) apart from "revoked" (log in again) by them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Authorization header missing")]
    MissingCredential,
    #[error("Malformed authorization header")]
    MalformedCredential,
    #[error("Invalid token: {0}")]
    InvalidCredential(String),
    #[error("Token has been revoked")]
    RevokedCredential,
    #[error("Token has expired")]
    ExpiredCredential,
    #[error("Authentication failed")]
    AuthenticationFailed,
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    /// Short stable name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedCredential => "malformed_credential",
            Self::InvalidCredential(_) => "invalid_credential",
            Self::RevokedCredential => "revoked_credential",
            Self::ExpiredCredential => "expired_credential",
            Self::AuthenticationFailed => "authentication_failed",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RejectionBody {
    pub error: bool,
    pub message: String,
    pub code: u16,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = RejectionBody {
            error: true,
            message: self.to_string(),
            code: status.as_u16(),
        };

        // Json sets `Content-Type: application/json`
        (status, Json(body)).into_response()
    }
}
