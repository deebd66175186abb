//! Observability utilities for the cost estimator.
//!
//! This crate provides:
//! - Prometheus metrics recording and text rendering
//! - Metrics for catalog batches, cache lookups and price resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, render_metrics, PricingMetrics};
//!
//! init_metrics()?;
//! PricingMetrics::record_cache_lookup(3, 1);
//! std::fs::write("metrics.prom", render_metrics().unwrap_or_default())?;
//! ```

pub mod pricing;

pub use pricing::{CatalogBatchTimer, PricingMetrics};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Without a recorder every metric call is a no-op, so this is only needed
/// when metrics are exported. Subsequent calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Render the Prometheus text exposition, if the recorder was initialized
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_histogram;

    describe_counter!(
        "pricing_catalog_requests_total",
        "Catalog GraphQL requests by status"
    );
    describe_counter!(
        "pricing_catalog_queries_total",
        "Price queries sent to the catalog"
    );
    describe_histogram!(
        "pricing_catalog_request_duration_seconds",
        "Catalog request duration in seconds"
    );
    describe_counter!(
        "pricing_cache_lookups_total",
        "Price cache lookups by result"
    );
    describe_counter!(
        "pricing_warnings_total",
        "Price selection warnings by resource type"
    );
    describe_counter!(
        "pricing_resolutions_total",
        "Resolver runs by status"
    );
    describe_counter!(
        "pricing_resources_resolved_total",
        "Resources handed to the resolver"
    );
    describe_histogram!(
        "pricing_resolution_duration_seconds",
        "Resolver run duration in seconds"
    );
}
