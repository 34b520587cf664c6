//! Version rollover and namespace clearing.

use super::{base, Origin};
use callguard_cache::{CacheStorage, CachedResponse, MemoryStorage, ResponseCache};
use std::sync::Arc;
use std::time::Duration;

/// Storage handle that several cache generations can share, standing in for
/// a persistent store that outlives a deploy.
#[derive(Clone, Default)]
struct SharedStorage(Arc<MemoryStorage>);

impl CacheStorage for SharedStorage {
    fn get(&self, namespace: &str, key: &str) -> Option<CachedResponse> {
        self.0.get(namespace, key)
    }

    fn put(&self, namespace: &str, key: &str, response: CachedResponse) {
        self.0.put(namespace, key, response);
    }

    fn delete(&self, namespace: &str, key: &str) -> bool {
        self.0.delete(namespace, key)
    }

    fn namespaces(&self) -> Vec<String> {
        self.0.namespaces()
    }

    fn delete_namespace(&self, namespace: &str) -> bool {
        self.0.delete_namespace(namespace)
    }

    fn len(&self, namespace: &str) -> usize {
        self.0.len(namespace)
    }
}

fn generation(storage: &SharedStorage, version: &str) -> ResponseCache {
    ResponseCache::builder()
        .prefix("hms")
        .version(version)
        .base_url(base())
        .storage(storage.clone())
        .build()
}

#[tokio::test]
async fn deploying_a_new_version_invalidates_old_entries() {
    let storage = SharedStorage::default();
    let mut origin = Origin::default();

    let v1 = generation(&storage, "v1");
    v1.cache_first(&mut origin, "/app.js").await.unwrap();
    v1.cache_first(&mut origin, "/logo.svg").await.unwrap();
    v1.cache_api_response("/api/wards", &CachedResponse::ok("[]"), Duration::from_secs(60))
        .unwrap();
    assert_eq!(
        storage.namespaces(),
        vec!["hms-api-v1", "hms-images-v1", "hms-static-v1"]
    );

    let v2 = generation(&storage, "v2");
    let fresh = v2.cache_first(&mut origin, "/app.js").await.unwrap();
    assert_eq!(fresh.body().as_ref(), b"/app.js v3");
    assert!(v2.get_cached_api_response("/api/wards").unwrap().is_none());

    let mut removed = v2.clear_old_caches();
    removed.sort();
    assert_eq!(removed, vec!["hms-api-v1", "hms-images-v1", "hms-static-v1"]);
    assert_eq!(storage.namespaces(), vec!["hms-static-v2"]);
}

#[tokio::test]
async fn clear_all_wipes_the_current_generation_too() {
    let storage = SharedStorage::default();
    let mut origin = Origin::default();
    let cache = generation(&storage, "v7");

    cache.cache_first(&mut origin, "/app.js").await.unwrap();
    cache.clear_all_caches();
    assert!(storage.namespaces().is_empty());

    cache.cache_first(&mut origin, "/app.js").await.unwrap();
    assert_eq!(origin.calls(), 2);
}

#[test]
fn foreign_namespaces_are_also_cleared() {
    let storage = SharedStorage::default();
    storage.put("someone-else", "k", CachedResponse::ok("x"));
    let cache = generation(&storage, "v1");

    assert_eq!(cache.clear_old_caches(), vec!["someone-else".to_string()]);
}
