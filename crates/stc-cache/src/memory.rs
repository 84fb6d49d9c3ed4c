//! In-process cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::{Cache, CacheBucket};

struct Entry {
    etag: String,
    value: Vec<u8>,
}

/// Entries keyed by bucket name, then by key.
type Store = HashMap<String, HashMap<String, Entry>>;

/// [`Cache`] keeping entries in memory for the life of the process.
///
/// Cloning a `MemoryCache` shares its storage.
#[derive(Clone, Default)]
pub struct MemoryCache {
    store: Arc<RwLock<Store>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            store: Arc::clone(&self.store),
        })
    }
}

/// A single bucket of a [`MemoryCache`].
///
/// A poisoned lock is recovered: entries are plain data and stay consistent
/// even if a writer panicked.
struct MemoryCacheBucket {
    name: String,
    store: Arc<RwLock<Store>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let entry = store.get(&self.name)?.get(key)?;
        if !etag.is_empty() && entry.etag != etag {
            tracing::trace!(bucket = %self.name, key, "Cache etag mismatch");
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(self.name.clone())
            .or_default()
            .insert(
                key.to_owned(),
                Entry {
                    etag: etag.to_owned(),
                    value: value.to_vec(),
                },
            );
    }

    fn remove(&self, key: &str) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(bucket) = store.get_mut(&self.name) {
            bucket.remove(key);
        }
    }
}
