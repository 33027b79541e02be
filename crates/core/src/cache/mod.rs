//! Read-through cache for remote catalog calls.
//!
//! Catalog adapters wrap each remote call in [`cached_call`]. The cache is
//! passed in explicitly; with no store, or with [`CachePolicy::Bypass`], the
//! call goes straight to the remote.
//!
//! The cache never fails a call: store faults are logged and the remote
//! result is used as is.

mod memory;
mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::CatalogError;
use crate::metrics;

/// Errors that can occur inside a cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Identifies one remote call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Catalog the call goes to.
    pub namespace: String,
    /// Call name plus its arguments.
    pub signature: String,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            signature: signature.into(),
        }
    }

    /// Hex SHA-256 of namespace and signature, used as the stored key.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.namespace.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.signature.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

/// How a call interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Serve cached values, store misses.
    #[default]
    Use,
    /// Always call the remote and overwrite the stored value.
    Refresh,
    /// Neither read nor write the cache.
    Bypass,
}

/// Persistent key/value store for serialized call results.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Store a value unless the key is already present. First write wins;
    /// returns whether the value was stored.
    fn put(&self, key: &CacheKey, value: &str) -> Result<bool, CacheError>;

    /// Store a value, overwriting any existing one.
    fn replace(&self, key: &CacheKey, value: &str) -> Result<(), CacheError>;

    /// Drop every entry, or only those of one namespace. Returns the number removed.
    fn clear(&self, namespace: Option<&str>) -> Result<usize, CacheError>;
}

fn lookup<T: DeserializeOwned>(store: &dyn CacheStore, key: &CacheKey) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => return Some(value),
            Err(e) => warn!(
                namespace = %key.namespace,
                signature = %key.signature,
                error = %e,
                "Discarding unreadable cache entry"
            ),
        },
        Ok(None) => {}
        Err(e) => warn!(namespace = %key.namespace, error = %e, "Cache read failed"),
    }
    None
}

fn store_value<T: Serialize>(
    store: &dyn CacheStore,
    key: &CacheKey,
    policy: CachePolicy,
    value: &T,
) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(namespace = %key.namespace, error = %e, "Failed to serialize call result");
            return;
        }
    };

    let result = match policy {
        CachePolicy::Refresh => store.replace(key, &raw),
        _ => store.put(key, &raw).map(|_| ()),
    };
    if let Err(e) = result {
        warn!(namespace = %key.namespace, error = %e, "Cache write failed");
    }
}

/// Run `compute` through the cache.
///
/// Errors from `compute` are returned unchanged and never cached.
pub async fn cached_call<T, F, Fut>(
    cache: Option<&dyn CacheStore>,
    key: &CacheKey,
    policy: CachePolicy,
    compute: F,
) -> Result<T, CatalogError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let store = match (cache, policy) {
        (Some(store), CachePolicy::Use | CachePolicy::Refresh) => store,
        _ => return compute().await,
    };

    if policy == CachePolicy::Use {
        if let Some(value) = lookup::<T>(store, key) {
            metrics::CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
            debug!(namespace = %key.namespace, signature = %key.signature, "Cache hit");
            return Ok(value);
        }
        metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
    }

    let value = compute().await?;
    store_value(store, key, policy, &value);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingStore;

    impl CacheStore for FailingStore {
        fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
            Err(CacheError::Database("disk on fire".to_string()))
        }

        fn put(&self, _key: &CacheKey, _value: &str) -> Result<bool, CacheError> {
            Err(CacheError::Database("disk on fire".to_string()))
        }

        fn replace(&self, _key: &CacheKey, _value: &str) -> Result<(), CacheError> {
            Err(CacheError::Database("disk on fire".to_string()))
        }

        fn clear(&self, _namespace: Option<&str>) -> Result<usize, CacheError> {
            Err(CacheError::Database("disk on fire".to_string()))
        }
    }

    async fn counted(calls: &AtomicUsize, value: u32) -> Result<u32, CatalogError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[test]
    fn test_digest_is_stable_and_namespaced() {
        let a = CacheKey::new("musicbrainz", "search:my hero");
        let b = CacheKey::new("beatsaber", "search:my hero");
        assert_eq!(a.digest(), a.clone().digest());
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[tokio::test]
    async fn test_hit_skips_compute() {
        let cache = MemoryCache::new();
        let store: &dyn CacheStore = &cache;
        let key = CacheKey::new("test", "call");
        let calls = AtomicUsize::new(0);

        let first: u32 = cached_call(Some(store), &key, CachePolicy::Use, || counted(&calls, 7))
            .await
            .unwrap();
        let second: u32 = cached_call(Some(store), &key, CachePolicy::Use, || counted(&calls, 8))
            .await
            .unwrap();

        assert_eq!(first, 7);
        assert_eq!(second, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bypass_never_touches_store() {
        let cache = MemoryCache::new();
        let store: &dyn CacheStore = &cache;
        let key = CacheKey::new("test", "call");
        let calls = AtomicUsize::new(0);

        for value in [1, 2] {
            let got: u32 =
                cached_call(Some(store), &key, CachePolicy::Bypass, || counted(&calls, value))
                    .await
                    .unwrap();
            assert_eq!(got, value);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_overwrites() {
        let cache = MemoryCache::new();
        let store: &dyn CacheStore = &cache;
        let key = CacheKey::new("test", "call");
        let calls = AtomicUsize::new(0);

        let _: u32 = cached_call(Some(store), &key, CachePolicy::Use, || counted(&calls, 1))
            .await
            .unwrap();
        let refreshed: u32 =
            cached_call(Some(store), &key, CachePolicy::Refresh, || counted(&calls, 2))
                .await
                .unwrap();
        let cached: u32 = cached_call(Some(store), &key, CachePolicy::Use, || counted(&calls, 3))
            .await
            .unwrap();

        assert_eq!(refreshed, 2);
        assert_eq!(cached, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = MemoryCache::new();
        let store: &dyn CacheStore = &cache;
        let key = CacheKey::new("test", "call");

        let err = cached_call::<u32, _, _>(Some(store), &key, CachePolicy::Use, || async {
            Err(CatalogError::RateLimitExceeded)
        })
        .await;
        assert!(matches!(err, Err(CatalogError::RateLimitExceeded)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_store_faults_do_not_fail_the_call() {
        let failing = FailingStore;
        let store: &dyn CacheStore = &failing;
        let key = CacheKey::new("test", "call");
        let calls = AtomicUsize::new(0);

        let got: u32 = cached_call(Some(store), &key, CachePolicy::Use, || counted(&calls, 5))
            .await
            .unwrap();
        assert_eq!(got, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_store_computes() {
        let key = CacheKey::new("test", "call");
        let calls = AtomicUsize::new(0);
        let got: u32 = cached_call(None, &key, CachePolicy::Use, || counted(&calls, 9))
            .await
            .unwrap();
        assert_eq!(got, 9);
    }
}
