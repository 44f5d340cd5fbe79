pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions, PersistMode};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::{debug, warn};

/// A thread-safe key-value store that can hold multiple collections.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens a store whose persistent collections live under `cache_dir`.
    ///
    /// Without a directory, or if the keyspace cannot be opened, only
    /// in-memory collections are available.
    pub fn open(cache_dir: Option<&Path>) -> Self {
        let keyspace = cache_dir
            .and_then(|path| match fjall::Config::new(path).open() {
                Ok(keyspace) => Some(keyspace),
                Err(e) => {
                    warn!("Could not open cache at {}: {}", path.display(), e);
                    None
                }
            })
            .map(Arc::new);

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(None)
    }

    pub fn is_persistent(&self) -> bool {
        self.keyspace.is_some()
    }
}

impl Drop for KeyValueStore {
    fn drop(&mut self) {
        if let Some(keyspace) = &self.keyspace {
            if let Err(e) = keyspace.persist(PersistMode::SyncAll) {
                warn!("Failed to persist cache: {}", e);
            }
        }
    }
}

impl Default for KeyValueStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Store for KeyValueStore {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>> {
        if let Some(collection) = self.collections.read().ok()?.get(name) {
            return Some(Arc::clone(collection));
        }
        if !create_if_missing {
            return None;
        }

        let collection: Arc<dyn KeyValueCollection> = if persist {
            let keyspace = self.keyspace.as_ref()?;
            let partition = keyspace
                .open_partition(name, PartitionCreateOptions::default())
                .map_err(|e| debug!("Failed to open partition {}: {}", name, e))
                .ok()?;
            Arc::new(DiskCollection::new(partition))
        } else {
            Arc::new(MemoryCollection::new())
        };

        let mut collections = self.collections.write().ok()?;
        Some(Arc::clone(
            collections.entry(name.to_string()).or_insert(collection),
        ))
    }
}
