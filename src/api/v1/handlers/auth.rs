/*
 * Responsibility
 * - POST /auth/token: issue an access token
 * - POST /auth/logout: revoke the presented token for the rest of its lifetime
 */
use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::auth::{TokenRequest, TokenResponse},
        extractors::AuthIdentity,
    },
    error::AppError,
    state::AppState,
};

pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_REQUEST", m))?;

    // The route is only mounted together with an issuer.
    let issuer = state.issuer.as_ref().ok_or_else(|| {
        tracing::error!("token route reached without an issuer");
        AppError::Internal
    })?;

    let issued = issuer.issue(&req.sub.to_claim(), req.email.as_deref(), req.claims)?;

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            access_token: issued.token,
            token_type: issued.token_type.to_string(),
            expires_in: issued.expires_in,
            expires_at: issued.expires_at,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<StatusCode, AppError> {
    let now = chrono::Utc::now().timestamp();
    let remaining = u64::try_from(identity.expires_at.saturating_sub(now)).unwrap_or(0);

    state
        .gate
        .revocations()
        .revoke(&identity.token_id, Some(Duration::from_secs(remaining.max(1))))
        .await?;

    tracing::info!(sub = %identity.id, token_id = %identity.token_id, "token revoked on logout");

    Ok(StatusCode::NO_CONTENT)
}
