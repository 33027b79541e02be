//! In-process cache store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{CacheError, CacheKey, CacheStore};

/// Cache store kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    // digest -> (namespace, value)
    entries: RwLock<HashMap<String, (String, String)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(&key.digest()).map(|(_, value)| value.clone()))
    }

    fn put(&self, key: &CacheKey, value: &str) -> Result<bool, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        let digest = key.digest();
        if entries.contains_key(&digest) {
            return Ok(false);
        }
        entries.insert(digest, (key.namespace.clone(), value.to_string()));
        Ok(true)
    }

    fn replace(&self, key: &CacheKey, value: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        entries.insert(key.digest(), (key.namespace.clone(), value.to_string()));
        Ok(())
    }

    fn clear(&self, namespace: Option<&str>) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        let before = entries.len();
        match namespace {
            Some(ns) => entries.retain(|_, (entry_ns, _)| entry_ns != ns),
            None => entries.clear(),
        }
        Ok(before - entries.len())
    }
}
