//! Metrics for price resolution against the pricing catalog.

use metrics::{counter, histogram};
use std::time::Instant;

/// Catalog and resolver metrics recorder
pub struct PricingMetrics;

impl PricingMetrics {
    // =========================================================================
    // Catalog Metrics
    // =========================================================================

    /// Record one GraphQL batch sent to the catalog
    pub fn record_catalog_batch(queries: usize, duration_secs: f64, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!("pricing_catalog_requests_total", "status" => status).increment(1);
        counter!("pricing_catalog_queries_total").increment(queries as u64);
        histogram!("pricing_catalog_request_duration_seconds", "status" => status)
            .record(duration_secs);

        tracing::debug!(
            queries = queries,
            duration_secs = duration_secs,
            status = status,
            "Catalog batch finished"
        );
    }

    /// Record cache lookups for one fetch
    pub fn record_cache_lookup(hits: usize, misses: usize) {
        counter!("pricing_cache_lookups_total", "result" => "hit").increment(hits as u64);
        counter!("pricing_cache_lookups_total", "result" => "miss").increment(misses as u64);
    }

    // =========================================================================
    // Resolver Metrics
    // =========================================================================

    /// Record a non-fatal price selection warning
    pub fn record_price_warning(resource_type: &str, warning: &str) {
        counter!(
            "pricing_warnings_total",
            "resource_type" => resource_type.to_string(),
            "warning" => warning.to_string()
        )
        .increment(1);
    }

    /// Record the outcome of a full resolver run
    pub fn record_resolution(resources: usize, failed: bool, duration_secs: f64) {
        let status = if failed { "failed" } else { "completed" };
        counter!("pricing_resolutions_total", "status" => status).increment(1);
        counter!("pricing_resources_resolved_total").increment(resources as u64);
        histogram!("pricing_resolution_duration_seconds").record(duration_secs);
    }
}

/// Timer guard for catalog batches.
///
/// Records the duration when `finish()` is called or, as a failure, when dropped.
pub struct CatalogBatchTimer {
    start: Instant,
    queries: usize,
    finished: bool,
}

impl CatalogBatchTimer {
    pub fn start(queries: usize) -> Self {
        Self {
            start: Instant::now(),
            queries,
            finished: false,
        }
    }

    /// Stop the timer and record the batch. Returns the duration in milliseconds.
    pub fn finish(&mut self, success: bool) -> u64 {
        if self.finished {
            return 0;
        }
        self.finished = true;

        let duration = self.start.elapsed();
        PricingMetrics::record_catalog_batch(self.queries, duration.as_secs_f64(), success);
        duration.as_millis() as u64
    }
}

impl Drop for CatalogBatchTimer {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_timer_finishes_once() {
        let mut timer = CatalogBatchTimer::start(3);
        timer.finish(true);
        assert_eq!(timer.finish(true), 0);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        PricingMetrics::record_cache_lookup(2, 1);
        PricingMetrics::record_price_warning("aws_instance", "No products found");
        PricingMetrics::record_resolution(4, false, 0.5);
    }
}
