use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Store, StoreError};

/// In-process store with TTL expiration.
///
/// Expired entries are evicted lazily on access. Counter values are kept
/// as ASCII integers so `incr` and `get` interoperate exactly as they do
/// on Redis. Intended for tests and single-process embeddings.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, MemEntry>>,
}

struct MemEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl MemEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;

        entries.insert(
            key.to_string(),
            MemEntry {
                value,
                expires_at: Some(Instant::now() + ttl),
            },
        );

        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut entries = self.entries.lock().await;

        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }

        match entries.get_mut(key) {
            Some(entry) => {
                let current: i64 = std::str::from_utf8(&entry.value)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| {
                        StoreError::Command(format!("value at {} is not an integer", key))
                    })?;

                let next = current + 1;
                entry.value = next.to_string().into_bytes();
                Ok(next)
            }
            None => {
                // Absent counts from zero, matching Redis INCR.
                entries.insert(
                    key.to_string(),
                    MemEntry {
                        value: b"1".to_vec(),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();

        store
            .set_with_ttl("key1", b"value1".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let value = store.get("key1").await.unwrap();
        assert_eq!(value, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = MemoryStore::new();

        store
            .set_with_ttl("key1", b"old".to_vec(), Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_resets_value_and_ttl() {
        let store = MemoryStore::new();

        store
            .set_with_ttl("key1", b"old".to_vec(), Duration::from_millis(20))
            .await
            .unwrap();
        store
            .set_with_ttl("key1", b"new".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.get("key1").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_incr_from_absent() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("counter").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_incr_sequence() {
        let store = MemoryStore::new();

        for expected in 1..=5 {
            assert_eq!(store.incr("counter").await.unwrap(), expected);
        }

        let raw = store.get("counter").await.unwrap().unwrap();
        assert_eq!(raw, b"5".to_vec());
    }

    #[tokio::test]
    async fn test_incr_non_integer_value() {
        let store = MemoryStore::new();

        store
            .set_with_ttl("key1", b"not a number".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let result = store.incr("key1").await;
        assert!(matches!(result, Err(StoreError::Command(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();

        store
            .set_with_ttl("key1", b"value1".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        store.delete("key1").await.unwrap();
        assert_eq!(store.get("key1").await.unwrap(), None);

        // Deleting again is a no-op, not an error.
        store.delete("key1").await.unwrap();
    }
}
