//! In-memory price cache owned by one catalog client.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::query::CatalogResult;

/// Write-once cache of catalog results keyed by [`PriceQuery::cache_key`].
///
/// Readers share the lock, writers take it exclusively. An entry is never
/// replaced once stored, and entries are immutable behind an `Arc`.
///
/// [`PriceQuery::cache_key`]: crate::query::PriceQuery::cache_key
#[derive(Debug)]
pub struct PriceCache {
    entries: RwLock<HashMap<String, Arc<CatalogResult>>>,
    object_limit: usize,
}

impl PriceCache {
    pub fn new(object_limit: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            object_limit,
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<CatalogResult>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store a result unless the key is present or the cache is full.
    ///
    /// Returns the entry that is cached for `key` afterwards, if any.
    pub async fn insert(&self, key: String, result: Arc<CatalogResult>) -> Option<Arc<CatalogResult>> {
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(&key) {
            return Some(existing.clone());
        }
        if entries.len() >= self.object_limit {
            debug!(
                limit = self.object_limit,
                "Price cache is at its object limit, not adding more keys"
            );
            return None;
        }
        entries.insert(key, result.clone());
        Some(result)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
