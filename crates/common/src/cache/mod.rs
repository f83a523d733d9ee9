//! In-memory memoization cache
//!
//! Provides:
//! - Generic get/set operations keyed per run
//! - Get-or-load with an async loader
//! - Hit/miss metrics per named cache

use crate::metrics::record_cache;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::RwLock;
use tracing::debug;

/// Memoization cache shared by concurrent tasks of one run
pub struct MemoCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
    name: String,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Create an empty cache; `name` labels its metrics
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            name: name.into(),
        }
    }

    /// Get a value from cache
    pub async fn get(&self, key: &K) -> Option<V> {
        let value = self.entries.read().await.get(key).cloned();
        record_cache(value.is_some(), &self.name);
        if value.is_some() {
            debug!(cache = %self.name, key = ?key, "Cache hit");
        } else {
            debug!(cache = %self.name, key = ?key, "Cache miss");
        }
        value
    }

    /// Set a value in cache
    pub async fn set(&self, key: K, value: V) {
        self.entries.write().await.insert(key, value);
    }

    /// Get or set with a loader function
    pub async fn get_or_load<F, Fut>(&self, key: K, loader: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        // Try to get from cache first
        if let Some(cached) = self.get(&key).await {
            return cached;
        }

        // The lock is not held across the loader so slow loads don't block readers
        let value = loader().await;
        self.set(key, value.clone()).await;
        value
    }

    /// Number of memoized entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_or_load_memoizes() {
        let cache: MemoCache<String, Option<String>> = MemoCache::new("test");
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_load("123/45".to_string(), || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Some("ECLI:EU:C:1946:1".to_string())
                })
                .await;
            assert_eq!(value.as_deref(), Some("ECLI:EU:C:1946:1"));
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_absent_values_are_memoized_too() {
        let cache: MemoCache<String, Option<String>> = MemoCache::new("test");
        cache.set("missing".to_string(), None).await;

        assert_eq!(cache.get(&"missing".to_string()).await, Some(None));
        assert_eq!(cache.get(&"other".to_string()).await, None);
    }
}
