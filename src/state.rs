/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - gate: TokenGate (codec, exclusion rules, revocation store)
 *   - issuer: TokenIssuer when token issuance is enabled
 * - Cloned per request (everything inside is Arc)
 */
use std::sync::Arc;

use crate::middleware::auth::TokenGate;
use crate::services::token::TokenIssuer;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<TokenGate>,
    pub issuer: Option<Arc<TokenIssuer>>,
}

impl AppState {
    pub fn new(gate: Arc<TokenGate>, issuer: Option<Arc<TokenIssuer>>) -> Self {
        Self { gate, issuer }
    }
}
