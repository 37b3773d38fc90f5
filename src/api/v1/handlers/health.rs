/*
 * Responsibility
 * - GET /health (liveness)
 * - excluded from the token gate by default
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
