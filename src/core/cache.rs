//! Key-value cache abstractions

use async_trait::async_trait;
use std::sync::Arc;

/// A named collection of raw key-value pairs.
///
/// Implementations never fail loudly: the cache is a performance aid, so I/O
/// errors are logged and surface as misses.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: Vec<u8>);
    async fn remove(&self, key: &[u8]);
    async fn clear(&self);
}

/// Hands out named collections, either persistent or process-local.
pub trait Store: Send + Sync {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;
}
