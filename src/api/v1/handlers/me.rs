use axum::Json;

use crate::api::v1::extractors::{AuthIdentity, AuthenticatedIdentity};

/// GET /me: the identity the gate attached (raw token omitted).
pub async fn me(AuthIdentity(identity): AuthIdentity) -> Json<AuthenticatedIdentity> {
    Json(identity)
}
