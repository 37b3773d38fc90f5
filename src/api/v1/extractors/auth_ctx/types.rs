/*
 * Responsibility
 * - The "authenticated identity" handlers see
 * - The gate validates the credential and stores this in request extensions;
 *   handlers only ever receive this type
 */
use serde::Serialize;
use serde_json::{Map, Value};

use crate::services::token::TokenClaims;

/// Identity attached to a request that passed the token gate.
///
/// - `id` is the token subject (`sub`), normalized to a string
/// - `token_id` is the revocation key (`jti`, or a hash of the raw token)
/// - `payload` is the full verified claim set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedIdentity {
    pub id: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub token: String,
    pub token_id: String,
    pub expires_at: i64,
    pub payload: Map<String, Value>,
}

impl AuthenticatedIdentity {
    pub fn from_claims(claims: TokenClaims, token: &str, token_id: String) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            token: token.to_string(),
            token_id,
            expires_at: claims.exp,
            payload: claims.payload,
        }
    }
}
