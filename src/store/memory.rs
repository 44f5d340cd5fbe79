use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Process-local collection backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let cache = self.inner.lock().await;
        let value = cache.get(key).cloned();
        if value.is_some() {
            debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
        } else {
            debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
        }
        value
    }

    async fn put(&self, key: &[u8], value: Vec<u8>) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
        cache.insert(key.to_vec(), value);
    }

    async fn remove(&self, key: &[u8]) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache REMOVE for key: {}", String::from_utf8_lossy(key));
    }

    async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_put() {
        let cache = MemoryCollection::new();

        assert!(cache.get(b"key1").await.is_none());

        cache.put(b"key1", b"123".to_vec()).await;
        assert_eq!(cache.get(b"key1").await, Some(b"123".to_vec()));

        assert!(cache.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = MemoryCollection::new();

        cache.put(b"key1", b"old".to_vec()).await;
        cache.put(b"key1", b"new".to_vec()).await;
        assert_eq!(cache.get(b"key1").await, Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let cache = MemoryCollection::new();

        cache.put(b"key1", b"1".to_vec()).await;
        cache.put(b"key2", b"2".to_vec()).await;

        cache.remove(b"key1").await;
        assert!(cache.get(b"key1").await.is_none());
        assert!(cache.get(b"key2").await.is_some());

        cache.clear().await;
        assert!(cache.get(b"key2").await.is_none());
    }
}
