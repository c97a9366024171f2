//! Cache store boundary, key scheme and TTL policy
//!
//! The cache-aside service talks to a [`CacheStore`]: a key-value store with
//! get, set-if-absent with expiry, and remaining-TTL lookups. Values are
//! opaque strings (JSON written by the service). Entries are never updated or
//! deleted by this crate; they are created once and left to expire.
//!
//! Providers: [`RedisStore`] for shared deployments, [`FileStore`] for a
//! single host (XDG cache directory), and [`MemoryStore`] for tests and
//! throwaway runs. [`Store`] picks one at startup.

mod file;
pub mod keys;
mod memory;
mod redis_store;
mod store;
pub mod ttl;

pub use file::FileStore;
pub use keys::{cache_key, Artifact};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::Store;
pub use ttl::TtlPolicy;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to the cache backend
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// The backend rejected or failed an operation
    #[error("Cache backend error: {0}")]
    BackendError(String),

    /// Filesystem error from the file store
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored entry could not be decoded
    #[error("Cache serialization error: {0}")]
    SerializationError(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with conditional writes and per-entry expiry
pub trait CacheStore: Send + Sync {
    /// Get a value by key
    ///
    /// Returns `Ok(Some(value))` on hit, `Ok(None)` on miss or expired entry.
    fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<String>>> + Send;

    /// Store `value` under `key` for `ttl`, only if no live value exists
    ///
    /// Returns `Ok(true)` if this call created the entry, `Ok(false)` if
    /// another writer got there first. An existing value is never replaced.
    fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = CacheResult<bool>> + Send;

    /// Time left before `key` expires, `None` if it does not exist
    fn ttl_remaining(
        &self,
        key: &str,
    ) -> impl Future<Output = CacheResult<Option<Duration>>> + Send;

    /// Name of the provider, for logs
    fn provider_name(&self) -> &'static str;
}
