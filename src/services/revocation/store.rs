use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::CacheError;

/// Registry of token identifiers invalidated before their natural expiry.
///
/// - `is_revoked`: `Ok(true)` when the id is blacklisted.
/// - `revoke`: idempotent; `ttl = None` keeps the entry until external cleanup.
/// - `Err(_)`: backend failure, callers must fail closed.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn is_revoked(&self, token_id: &str) -> Result<bool, RevocationError>;

    async fn revoke(&self, token_id: &str, ttl: Option<Duration>) -> Result<(), RevocationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("empty token id")]
    EmptyTokenId,

    #[error(transparent)]
    Cache(#[from] CacheError),
}
