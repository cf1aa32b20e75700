//! Unbounded in-memory cache backend.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use super::CacheBackend;
use crate::types::CacheKey;

/// Plain map under a single lock. Entries live until overwritten or cleared.
///
/// This is the default backend: no capacity bound, no expiry. The lock is
/// held only for the map operation itself.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn insert(&self, key: CacheKey, value: Value) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    fn remove(&self, key: &CacheKey) -> Option<Value> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn len(&self) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len() as u64
    }
}
