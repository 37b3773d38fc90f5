/*
 * Responsibility
 * - URL layout of v1
 * - /health, /auth/token (optional), /auth/logout, /me
 * - the token gate covers the whole router; exemptions come from exclusion rules
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{issue_token, logout},
    health::health,
    me::me,
};

pub fn routes(with_token_issuer: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/auth/logout", post(logout))
        .route("/me", get(me));

    if with_token_issuer {
        router.route("/auth/token", post(issue_token))
    } else {
        router
    }
}
