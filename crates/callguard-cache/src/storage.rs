//! Namespaced response storage.

use crate::response::CachedResponse;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Backing store for cached responses, partitioned into named namespaces.
///
/// Implementations must be cheap to call from async code; they are never
/// awaited and are called without holding any other lock.
pub trait CacheStorage: Send + Sync + 'static {
    fn get(&self, namespace: &str, key: &str) -> Option<CachedResponse>;

    /// Inserts or overwrites an entry, creating the namespace if needed.
    fn put(&self, namespace: &str, key: &str, response: CachedResponse);

    /// Returns whether an entry was removed.
    fn delete(&self, namespace: &str, key: &str) -> bool;

    fn namespaces(&self) -> Vec<String>;

    /// Returns whether the namespace existed.
    fn delete_namespace(&self, namespace: &str) -> bool;

    /// Number of entries in a namespace; zero if it does not exist.
    fn len(&self, namespace: &str) -> usize;
}

/// In-process storage. Each namespace is an LRU map, bounded when a
/// capacity is given.
#[derive(Debug)]
pub struct MemoryStorage {
    capacity: Option<NonZeroUsize>,
    namespaces: Mutex<HashMap<String, LruCache<String, CachedResponse>>>,
}

impl MemoryStorage {
    /// Storage with no bound on entries per namespace.
    pub fn new() -> Self {
        Self {
            capacity: None,
            namespaces: Mutex::new(HashMap::new()),
        }
    }

    /// Storage evicting the least recently used entry once a namespace
    /// holds `capacity` entries.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            capacity: Some(capacity),
            namespaces: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, LruCache<String, CachedResponse>>> {
        self.namespaces.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn new_namespace(&self) -> LruCache<String, CachedResponse> {
        match self.capacity {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStorage for MemoryStorage {
    fn get(&self, namespace: &str, key: &str) -> Option<CachedResponse> {
        self.lock().get_mut(namespace)?.get(key).cloned()
    }

    fn put(&self, namespace: &str, key: &str, response: CachedResponse) {
        let mut namespaces = self.lock();
        if !namespaces.contains_key(namespace) {
            let fresh = self.new_namespace();
            namespaces.insert(namespace.to_string(), fresh);
        }
        if let Some(entries) = namespaces.get_mut(namespace) {
            entries.put(key.to_string(), response);
        }
    }

    fn delete(&self, namespace: &str, key: &str) -> bool {
        self.lock()
            .get_mut(namespace)
            .and_then(|entries| entries.pop(key))
            .is_some()
    }

    fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn delete_namespace(&self, namespace: &str) -> bool {
        self.lock().remove(namespace).is_some()
    }

    fn len(&self, namespace: &str) -> usize {
        self.lock().get(namespace).map_or(0, LruCache::len)
    }
}
