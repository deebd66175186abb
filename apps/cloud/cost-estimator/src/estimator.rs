//! Cost Estimator Service
//!
//! Prices projects against the catalog and turns them into breakdowns. One
//! catalog client, and so one cache, is shared by every project priced by
//! the same estimator.

use core_config::PricingApiConfig;
use domain_pricing::{
    Breakdown, CatalogTransport, HttpCatalogTransport, PriceCache, PriceCatalogClient,
    PriceResolver, PricingResult, Project, ResourceWarnings,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct CostEstimator<T> {
    resolver: PriceResolver<T>,
}

impl CostEstimator<HttpCatalogTransport> {
    /// Estimator talking to the configured pricing API
    pub fn from_config(config: &PricingApiConfig) -> PricingResult<Self> {
        let transport = HttpCatalogTransport::from_config(config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: CatalogTransport + 'static> CostEstimator<T> {
    pub fn new(transport: T, config: &PricingApiConfig) -> Self {
        let cache = (!config.cache_disabled).then(|| PriceCache::new(config.cache_object_limit));
        let client = PriceCatalogClient::new(transport, config.currency.clone())
            .with_batch_size(config.batch_size)
            .with_cache(cache);

        let mut resolver = PriceResolver::new(Arc::new(client));
        if let Some(workers) = config.workers {
            resolver = resolver.with_workers(workers);
        }

        Self { resolver }
    }

    pub fn warnings(&self) -> &ResourceWarnings {
        self.resolver.warnings()
    }

    /// Resolve prices for every resource and calculate the costs
    pub async fn breakdown(&self, project: Project) -> PricingResult<Breakdown> {
        let breakdown = self.price(project).await?;
        self.log_warnings();
        Ok(breakdown)
    }

    /// Resolve both snapshots of a project, repeated lookups hit the cache
    pub async fn breakdown_pair(&self, past: Project, current: Project) -> PricingResult<(Breakdown, Breakdown)> {
        let past = self.price(past).await?;
        let current = self.price(current).await?;
        self.log_warnings();
        Ok((past, current))
    }

    async fn price(&self, mut project: Project) -> PricingResult<Breakdown> {
        info!(
            project = %project.name,
            resources = project.resources.len(),
            workers = self.resolver.workers(),
            "Resolving prices"
        );
        self.resolver.resolve_project(&mut project).await?;
        Ok(Breakdown::from(project))
    }

    fn log_warnings(&self) {
        let warnings = self.resolver.warnings();
        if warnings.is_empty() {
            return;
        }
        for (resource_type, messages) in warnings.snapshot() {
            for (message, count) in messages {
                warn!(resource_type = %resource_type, count = count, "{message}");
            }
        }
    }
}

/// Calculate costs of a project whose components already carry prices
pub fn breakdown_priced(project: Project) -> Breakdown {
    Breakdown::from(project)
}
