//! Key-value store adapter.
//!
//! The cached fetcher talks to its store through the [`Store`] trait so
//! the backend can be swapped: [`RedisStore`] for the real networked
//! service, [`MemoryStore`] for tests and single-process embeddings.

use std::time::Duration;

use async_trait::async_trait;

pub mod memory;
pub mod redis;


pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Atomic key-value store with per-key expiry.
///
/// Key-level atomicity is a correctness requirement on implementations:
/// concurrent `incr` calls on the same key must not lose updates.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the value at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` at `key`, overwriting any existing value and
    /// resetting its expiry to `ttl` from now.
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration)
        -> Result<(), StoreError>;

    /// Atomically increment the integer at `key` by one and return the
    /// new value. An absent key counts from zero; a value that is not an
    /// integer is a command error.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Remove `key`. Deleting an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store command error: {0}")]
    Command(String),

    #[error("Store operation timed out: {0}")]
    Timeout(String),
}

impl From<StoreError> for webcache_common::WebCacheError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Timeout(msg) => webcache_common::WebCacheError::Timeout(msg),
            other => webcache_common::WebCacheError::Store(other.to_string()),
        }
    }
}
