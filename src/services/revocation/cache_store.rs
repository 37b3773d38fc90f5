use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

use crate::services::{
    cache::{CacheClient, ValkeyClient},
    revocation::store::{RevocationError, RevocationStore},
};

pub const DEFAULT_PREFIX: &str = "auth:revoked";

/// Revocation store on top of any `CacheClient` backend.
///
/// Entries are stored as `<prefix>:<token-id> = "1"`.
#[derive(Clone)]
pub struct CacheRevocationStore<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions across environments
    prefix: String,
}

impl<C: CacheClient> std::fmt::Debug for CacheRevocationStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRevocationStore")
            .field("backend", &self.cache.backend_name())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl CacheRevocationStore<ValkeyClient> {
    pub async fn connect(redis_url: &str, prefix: impl Into<String>) -> Result<Self, RevocationError> {
        let client = ValkeyClient::new(redis_url).await?;
        Ok(Self::new(Arc::new(client), prefix))
    }
}

impl<C: CacheClient> CacheRevocationStore<C> {
    pub fn new(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, token_id: &str) -> String {
        format!("{}:{}", self.prefix, token_id)
    }

    fn checked_key(&self, token_id: &str) -> Result<String, RevocationError> {
        if token_id.trim().is_empty() {
            return Err(RevocationError::EmptyTokenId);
        }
        Ok(self.key(token_id))
    }
}

#[async_trait]
impl<C: CacheClient> RevocationStore for CacheRevocationStore<C> {
    async fn is_revoked(&self, token_id: &str) -> Result<bool, RevocationError> {
        let key = self.checked_key(token_id)?;
        Ok(self.cache.exists(&key).await?)
    }

    async fn revoke(&self, token_id: &str, ttl: Option<Duration>) -> Result<(), RevocationError> {
        let key = self.checked_key(token_id)?;
        self.cache.set_with_ttl(&key, "1", ttl).await?;

        tracing::debug!(
            backend = self.cache.backend_name(),
            key = %key,
            ttl_secs = ttl.map(|t| t.as_secs()),
            "token revoked"
        );
        Ok(())
    }
}
