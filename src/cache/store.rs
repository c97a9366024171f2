//! Store selected at startup
//!
//! Uses enum dispatch so the service stays generic over one concrete
//! [`CacheStore`] while the binary picks the provider from configuration.

use std::time::Duration;

use tracing::info;

use super::{CacheError, CacheResult, CacheStore, FileStore, MemoryStore, RedisStore};
use crate::config::StoreSpec;

/// One of the available cache providers
#[derive(Debug, Clone)]
pub enum Store {
    /// Redis provider (boxed to reduce enum size)
    Redis(Box<RedisStore>),
    File(FileStore),
    Memory(MemoryStore),
}

impl Store {
    /// Opens the configured provider
    ///
    /// This is the startup phase: it completes (connection verified, cache
    /// directory created) or fails before any request is served.
    pub async fn connect(spec: &StoreSpec) -> CacheResult<Self> {
        let store = match spec {
            StoreSpec::Memory => Store::Memory(MemoryStore::new()),
            StoreSpec::File(Some(dir)) => Store::File(FileStore::with_dir(dir.clone())),
            StoreSpec::File(None) => Store::File(FileStore::new().ok_or_else(|| {
                CacheError::ConnectionError("Cannot determine a cache directory".to_string())
            })?),
            StoreSpec::Redis(url) => Store::Redis(Box::new(RedisStore::connect(url).await?)),
        };

        if let Store::File(file) = &store {
            tokio::fs::create_dir_all(file.cache_dir()).await?;
        }

        info!(provider = store.provider_name(), "Cache store ready");
        Ok(store)
    }
}

impl CacheStore for Store {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self {
            Self::Redis(s) => s.get(key).await,
            Self::File(s) => s.get(key).await,
            Self::Memory(s) => s.get(key).await,
        }
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        match self {
            Self::Redis(s) => s.set_if_absent(key, value, ttl).await,
            Self::File(s) => s.set_if_absent(key, value, ttl).await,
            Self::Memory(s) => s.set_if_absent(key, value, ttl).await,
        }
    }

    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<Duration>> {
        match self {
            Self::Redis(s) => s.ttl_remaining(key).await,
            Self::File(s) => s.ttl_remaining(key).await,
            Self::Memory(s) => s.ttl_remaining(key).await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match self {
            Self::Redis(s) => s.provider_name(),
            Self::File(s) => s.provider_name(),
            Self::Memory(s) => s.provider_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_memory() {
        let store = Store::connect(&StoreSpec::Memory).await.expect("Should connect");
        assert_eq!(store.provider_name(), "memory");
        assert!(store.set_if_absent("k", "v", Duration::from_secs(5)).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_connect_file_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("store");

        let store = Store::connect(&StoreSpec::File(Some(dir.clone())))
            .await
            .expect("Should connect");

        assert_eq!(store.provider_name(), "file");
        assert!(dir.exists());
    }

    #[tokio::test]
    async fn test_connect_redis_failure_is_reported() {
        let result = Store::connect(&StoreSpec::Redis("redis://127.0.0.1:1".to_string())).await;
        assert!(matches!(result, Err(CacheError::ConnectionError(_))));
    }
}
