//! Pricing catalog client
//!
//! Packs price queries into batched GraphQL requests, serves repeated
//! queries from the [`PriceCache`] and hands results back in query order.

use async_trait::async_trait;
use observability::{CatalogBatchTimer, PricingMetrics};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::cache::PriceCache;
use crate::error::{PricingError, PricingResult};
use crate::models::{PriceFilter, ProductFilter};
use crate::query::{CatalogResult, GraphQLQuery, PriceQuery};

/// Sends one batch of GraphQL queries to the catalog.
///
/// Implementations translate connection and server failures into
/// [`PricingError`] variants; callers never look at raw responses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    /// Results must come back in the same order as `queries`
    async fn post_queries(&self, queries: &[GraphQLQuery]) -> PricingResult<Vec<CatalogResult>>;
}

#[async_trait]
impl<T: CatalogTransport + ?Sized> CatalogTransport for Arc<T> {
    async fn post_queries(&self, queries: &[GraphQLQuery]) -> PricingResult<Vec<CatalogResult>> {
        (**self).post_queries(queries).await
    }
}

/// Catalog client with batching, in-request deduplication and caching
pub struct PriceCatalogClient<T> {
    transport: T,
    currency: String,
    batch_size: usize,
    cache: Option<PriceCache>,
}

impl<T: CatalogTransport> PriceCatalogClient<T> {
    pub const DEFAULT_BATCH_SIZE: usize = 100;
    pub const DEFAULT_CACHE_OBJECT_LIMIT: usize = 200;

    pub fn new(transport: T, currency: impl Into<String>) -> Self {
        Self {
            transport,
            currency: currency.into(),
            batch_size: Self::DEFAULT_BATCH_SIZE,
            cache: Some(PriceCache::new(Self::DEFAULT_CACHE_OBJECT_LIMIT)),
        }
    }

    /// Maximum number of queries per request, at least one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Replace the cache, `None` disables caching
    pub fn with_cache(mut self, cache: Option<PriceCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn cache(&self) -> Option<&PriceCache> {
        self.cache.as_ref()
    }

    /// Build the lookup for a component's filters in this client's currency
    pub fn query_for(&self, product_filter: &ProductFilter, price_filter: Option<&PriceFilter>) -> PriceQuery {
        PriceQuery::new(product_filter.clone(), price_filter.cloned(), self.currency.clone())
    }

    /// Resolve every query, returning one result per query in the same order.
    ///
    /// Cached keys never reach the network and identical keys within the
    /// call are sent once. Any transport or API failure fails the whole call.
    pub async fn fetch(&self, queries: &[PriceQuery]) -> PricingResult<Vec<Arc<CatalogResult>>> {
        let keys: Vec<String> = queries.iter().map(PriceQuery::cache_key).collect();
        let mut results: Vec<Option<Arc<CatalogResult>>> = vec![None; queries.len()];

        if let Some(cache) = &self.cache {
            for (slot, key) in results.iter_mut().zip(&keys) {
                *slot = cache.get(key).await;
            }
        }

        let mut pending: Vec<(&str, &PriceQuery)> = Vec::new();
        let mut seen: HashMap<&str, ()> = HashMap::new();
        let mut hits = 0;
        for ((slot, key), query) in results.iter().zip(&keys).zip(queries) {
            if slot.is_some() {
                hits += 1;
                continue;
            }
            if seen.insert(key.as_str(), ()).is_none() {
                pending.push((key.as_str(), query));
            }
        }
        PricingMetrics::record_cache_lookup(hits, queries.len() - hits);
        debug!(
            queries = queries.len(),
            cached = hits,
            to_fetch = pending.len(),
            "Resolving price queries"
        );

        let mut fetched: HashMap<&str, Arc<CatalogResult>> = HashMap::with_capacity(pending.len());
        for chunk in pending.chunks(self.batch_size) {
            let batch: Vec<GraphQLQuery> = chunk.iter().map(|(_, q)| q.to_graphql()).collect();
            let mut timer = CatalogBatchTimer::start(batch.len());
            let response = self.transport.post_queries(&batch).await?;

            if response.len() != batch.len() {
                return Err(PricingError::Transport(format!(
                    "Pricing API returned {} results for {} queries",
                    response.len(),
                    batch.len()
                )));
            }
            timer.finish(true);

            for ((key, _), result) in chunk.iter().zip(response) {
                let result = Arc::new(result);
                let stored = match &self.cache {
                    // a concurrent fetch may have stored the key first, keep its result
                    Some(cache) => cache
                        .insert(key.to_string(), result.clone())
                        .await
                        .unwrap_or(result),
                    None => result,
                };
                fetched.insert(key, stored);
            }
        }

        results
            .into_iter()
            .zip(&keys)
            .map(|(slot, key)| {
                slot.or_else(|| fetched.get(key.as_str()).cloned())
                    .ok_or_else(|| PricingError::Internal(format!("no result for query {key}")))
            })
            .collect()
    }
}
