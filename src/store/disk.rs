use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use fjall::PartitionHandle;
use tracing::debug;

/// Persistent collection stored in a fjall partition.
pub struct DiskCollection {
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(partition: PartitionHandle) -> Self {
        Self { partition }
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
                Some(value.to_vec())
            }
            Ok(None) => {
                debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
                None
            }
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: Vec<u8>) {
        match self.partition.insert(key, value) {
            Ok(()) => debug!("Cache PUT for key: {}", String::from_utf8_lossy(key)),
            Err(e) => debug!("DiskCollection put error: {}", e),
        }
    }

    async fn remove(&self, key: &[u8]) {
        if let Err(e) = self.partition.remove(key) {
            debug!("DiskCollection remove error: {}", e);
        }
    }

    async fn clear(&self) {
        let keys: Vec<_> = self.partition.keys().filter_map(|k| k.ok()).collect();
        for key in keys {
            if let Err(e) = self.partition.remove(key) {
                debug!("DiskCollection clear error: {}", e);
            }
        }
        debug!("Cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;

    fn open_collection(path: &std::path::Path) -> (fjall::Keyspace, DiskCollection) {
        let keyspace = fjall::Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        (keyspace, DiskCollection::new(partition))
    }

    #[tokio::test]
    async fn test_disk_collection_get_put() {
        let dir = tempdir().unwrap();
        let (_keyspace, cache) = open_collection(dir.path());

        assert!(cache.get(b"key1").await.is_none());

        cache.put(b"key1", b"123".to_vec()).await;
        assert_eq!(cache.get(b"key1").await, Some(b"123".to_vec()));

        assert!(cache.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_collection_remove_and_clear() {
        let dir = tempdir().unwrap();
        let (_keyspace, cache) = open_collection(dir.path());

        cache.put(b"key1", b"1".to_vec()).await;
        cache.put(b"key2", b"2".to_vec()).await;

        cache.remove(b"key1").await;
        assert!(cache.get(b"key1").await.is_none());

        cache.clear().await;
        assert!(cache.get(b"key2").await.is_none());
    }
}
