//! In-process cache backend.
//!
//! Used when no Valkey URL is configured (single instance deployments, tests).
//! Expired entries are purged on every write, so keys that are never read
//! again do not pile up.
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::services::cache::client::{CacheClient, CacheResult};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live value stored under `key`, if any.
    pub fn value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .lock()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone())
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        Ok(self.entries.lock().get(key).is_some_and(|e| e.is_live(now)))
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        entries.retain(|_, e| e.is_live(now));
        entries.insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_entries(cache: &MemoryCache) -> usize {
        cache.entries.lock().len()
    }

    #[tokio::test]
    async fn set_and_read_back() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", None).await.unwrap();
        cache.set_with_ttl("k", "w", None).await.unwrap();

        assert_eq!(cache.value("k").as_deref(), Some("w"));
        assert!(cache.exists("k").await.unwrap());
        assert!(!cache.exists("other").await.unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("short", "1", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        cache.set_with_ttl("forever", "1", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(!cache.exists("short").await.unwrap());
        assert_eq!(cache.value("short"), None);
        assert!(cache.exists("forever").await.unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn writes_purge_expired_entries() {
        let cache = MemoryCache::new();
        for i in 0..200 {
            cache
                .set_with_ttl(&format!("revoked:{i}"), "1", Some(Duration::from_millis(200)))
                .await
                .unwrap();
        }
        assert_eq!(stored_entries(&cache), 200);

        tokio::time::sleep(Duration::from_millis(300)).await;
        cache.set_with_ttl("revoked:last", "1", None).await.unwrap();

        assert_eq!(stored_entries(&cache), 1);
        assert!(cache.exists("revoked:last").await.unwrap());
    }
}
