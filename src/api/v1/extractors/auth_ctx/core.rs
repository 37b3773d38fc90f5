use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::middleware::auth::rejection::GateError;

use super::AuthenticatedIdentity;

/// Extractor for the identity attached by the token gate.
/// Assumes the gate middleware already inserted it into request extensions;
/// when missing (route not behind the gate, or excluded) it answers 401.
pub struct AuthIdentity(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .map(AuthIdentity)
            .ok_or(GateError::MissingCredential)
    }
}
