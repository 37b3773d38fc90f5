//! Cache client interface used by higher-level services (token revocation, etc.).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Kept independent from `AppError` so callers decide how to fail
/// (the token gate fails closed on any of these).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A small, string-based cache interface.
///
/// Every operation a backend forwards is listed here; callers hold a typed
/// handle to the backend rather than relying on dynamic dispatch by name.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Whether the key currently exists (and has not expired).
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    // Set value unconditionally. `None` stores the key without expiry.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Option<Duration>)
    -> CacheResult<()>;
}

/// TTLs are whole seconds on the wire; anything shorter becomes one second.
pub fn clamp_ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}
