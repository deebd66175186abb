//! Price resolver
//!
//! Fills in the price of every cost component of a project using a pool of
//! workers that share one [`PriceCatalogClient`].
//!
//! Each worker pulls `(index, Resource)` jobs from a bounded queue, prices
//! the whole subtree of that resource and hands the resource back with its
//! outcome. The caller reassembles resources by submission index. The first
//! fatal error cancels the run: queued jobs are skipped, in-flight lookups
//! are abandoned, and every resource still comes back to the caller.

use observability::PricingMetrics;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::client::{CatalogTransport, PriceCatalogClient};
use crate::error::{PricingError, PricingResult};
use crate::query::{CatalogResult, PriceQuery};
use crate::resource::{CostComponent, Project, Resource};
use crate::warnings::{PriceWarning, ResourceWarnings};

/// Pool size used when none is configured: four per CPU, between 4 and 16
pub fn default_worker_count() -> usize {
    (num_cpus::get() * 4).clamp(4, 16)
}

type Job = (usize, Resource);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobStatus {
    Resolved,
    Failed,
    /// Dequeued after the run was cancelled, never started
    Skipped,
    /// Abandoned while waiting on the catalog
    Cancelled,
}

struct JobOutcome {
    index: usize,
    resource: Resource,
    status: JobStatus,
}

/// Shared between workers of a single run
struct RunState {
    cancel: watch::Sender<bool>,
    first_error: StdMutex<Option<PricingError>>,
}

impl RunState {
    fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel,
            first_error: StdMutex::new(None),
        }
    }

    /// Keep the first error only and cancel the rest of the run
    fn fail(&self, err: PricingError) {
        if let Ok(mut first) = self.first_error.lock() {
            if first.is_none() {
                *first = Some(err);
            }
        }
        self.cancel.send_replace(true);
    }

    fn take_error(&self) -> Option<PricingError> {
        self.first_error.lock().ok().and_then(|mut e| e.take())
    }
}

/// Resolves a cost component price for every resource in a project
pub struct PriceResolver<T> {
    pricer: Arc<ResourcePricer<T>>,
    workers: usize,
}

impl<T: CatalogTransport + 'static> PriceResolver<T> {
    pub fn new(client: Arc<PriceCatalogClient<T>>) -> Self {
        Self {
            pricer: Arc::new(ResourcePricer {
                client,
                warnings: Arc::new(ResourceWarnings::new()),
            }),
            workers: default_worker_count(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Warnings recorded by every run of this resolver
    pub fn warnings(&self) -> &ResourceWarnings {
        &self.pricer.warnings
    }

    /// Price all resources of `project` in place
    pub async fn resolve_project(&self, project: &mut Project) -> PricingResult<()> {
        let resources = std::mem::take(&mut project.resources);
        let (resources, result) = self.resolve(resources).await;
        project.resources = resources;
        result
    }

    /// Price `resources`, returning them in their original order together
    /// with the outcome of the run.
    pub async fn resolve(&self, resources: Vec<Resource>) -> (Vec<Resource>, PricingResult<()>) {
        let total = resources.len();
        if total == 0 {
            return (resources, Ok(()));
        }

        let started = Instant::now();
        let workers = self.workers.min(total);
        let state = Arc::new(RunState::new());
        let (job_tx, job_rx) = mpsc::channel::<Job>(workers);
        let job_rx = Arc::new(Mutex::new(job_rx));

        debug!(resources = total, workers = workers, "Starting price resolution");

        let mut join_set: JoinSet<Vec<JobOutcome>> = JoinSet::new();
        for _ in 0..workers {
            join_set.spawn(run_worker(
                Arc::clone(&self.pricer),
                Arc::clone(&job_rx),
                Arc::clone(&state),
            ));
        }

        let mut outcomes: Vec<JobOutcome> = Vec::with_capacity(total);
        for job in resources.into_iter().enumerate() {
            if let Err(mpsc::error::SendError((index, resource))) = job_tx.send(job).await {
                // every worker is gone, nothing will take the job
                outcomes.push(JobOutcome {
                    index,
                    resource,
                    status: JobStatus::Skipped,
                });
            }
        }
        drop(job_tx);

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(worker_outcomes) => outcomes.extend(worker_outcomes),
                Err(e) => {
                    error!(error = %e, "Price resolver worker terminated abnormally");
                    state.fail(PricingError::Internal(format!("worker terminated: {e}")));
                }
            }
        }

        outcomes.sort_by_key(|o| o.index);
        let count = |status: JobStatus| outcomes.iter().filter(|o| o.status == status).count();
        let (resolved, failed) = (count(JobStatus::Resolved), count(JobStatus::Failed));
        let (skipped, cancelled) = (count(JobStatus::Skipped), count(JobStatus::Cancelled));
        if outcomes.len() != total {
            warn!(
                expected = total,
                returned = outcomes.len(),
                "Some resources were lost by failed workers"
            );
        }

        let result = match state.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        };
        let elapsed = started.elapsed();
        PricingMetrics::record_resolution(total, result.is_err(), elapsed.as_secs_f64());

        if result.is_ok() {
            info!(
                resources = total,
                warnings = self.pricer.warnings.total(),
                duration_ms = elapsed.as_millis() as u64,
                "Price resolution finished"
            );
        } else {
            warn!(
                resources = total,
                resolved = resolved,
                failed = failed,
                skipped = skipped,
                cancelled = cancelled,
                "Price resolution aborted"
            );
        }

        (outcomes.into_iter().map(|o| o.resource).collect(), result)
    }
}

async fn run_worker<T: CatalogTransport>(
    pricer: Arc<ResourcePricer<T>>,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    state: Arc<RunState>,
) -> Vec<JobOutcome> {
    let mut cancel = state.cancel.subscribe();
    let mut outcomes = Vec::new();

    loop {
        let job = jobs.lock().await.recv().await;
        let Some((index, mut resource)) = job else {
            break;
        };

        let status = if *cancel.borrow() {
            JobStatus::Skipped
        } else {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => JobStatus::Cancelled,
                result = pricer.price_resource(&mut resource) => match result {
                    Ok(()) => JobStatus::Resolved,
                    Err(e) => {
                        error!(resource = %resource.name, error = %e, "Failed to resolve prices");
                        state.fail(e);
                        JobStatus::Failed
                    }
                },
            }
        };

        outcomes.push(JobOutcome {
            index,
            resource,
            status,
        });
    }

    outcomes
}

/// Completes once the run is cancelled
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|c| *c).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Prices one resource tree with a shared client
struct ResourcePricer<T> {
    client: Arc<PriceCatalogClient<T>>,
    warnings: Arc<ResourceWarnings>,
}

impl<T: CatalogTransport> ResourcePricer<T> {
    async fn price_resource(&self, resource: &mut Resource) -> PricingResult<()> {
        let mut queries = Vec::new();
        self.collect_queries(resource, &mut queries);

        let results = if queries.is_empty() {
            Vec::new()
        } else {
            debug!(
                resource = %resource.name,
                components = queries.len(),
                "Getting pricing details"
            );
            self.client.fetch(&queries).await?
        };

        let mut results = results.into_iter();
        self.apply_prices(resource, "", &mut results);
        Ok(())
    }

    /// One query per looked-up component, depth first, components before sub resources
    fn collect_queries(&self, resource: &Resource, queries: &mut Vec<PriceQuery>) {
        if !resource.is_priceable() {
            return;
        }
        for component in resource.cost_components.iter().filter(|c| c.needs_lookup()) {
            if let Some(filter) = &component.product_filter {
                queries.push(self.client.query_for(filter, component.price_filter.as_ref()));
            }
        }
        for sub in &resource.sub_resources {
            self.collect_queries(sub, queries);
        }
    }

    /// Walks the tree in the same order as [`Self::collect_queries`]
    fn apply_prices<I>(&self, resource: &mut Resource, parent_type: &str, results: &mut I)
    where
        I: Iterator<Item = Arc<CatalogResult>>,
    {
        if !resource.is_priceable() {
            return;
        }

        let resource_type = if resource.resource_type.is_empty() {
            parent_type.to_string()
        } else {
            resource.resource_type.clone()
        };
        let resource_name = resource.name.clone();

        resource.cost_components.retain_mut(|component| {
            if let Some(custom) = component.custom_price {
                component.set_price(custom, None);
                return true;
            }
            if !component.needs_lookup() {
                return true;
            }
            match results.next() {
                Some(result) => self.select_price(&resource_name, &resource_type, component, &result),
                None => true,
            }
        });

        for sub in &mut resource.sub_resources {
            self.apply_prices(sub, &resource_type, results);
        }
    }

    /// Apply the catalog result to `component`, returns false when it should be dropped
    fn select_price(
        &self,
        resource_name: &str,
        resource_type: &str,
        component: &mut CostComponent,
        result: &CatalogResult,
    ) -> bool {
        let products = result.products();
        if products.is_empty() {
            return self.missing_price(resource_name, resource_type, component, PriceWarning::NoProducts);
        }

        let priced: Vec<_> = products.iter().filter(|p| p.has_prices()).collect();
        let Some(product) = priced.first() else {
            return self.missing_price(resource_name, resource_type, component, PriceWarning::NoPrices);
        };

        if priced.len() > 1 {
            warn!(
                resource = %resource_name,
                component = %component.name,
                products = priced.len(),
                "Multiple products found, using the first one"
            );
            self.warnings.record(resource_type, PriceWarning::MultipleProducts);
        }
        if product.prices.len() > 1 {
            warn!(
                resource = %resource_name,
                component = %component.name,
                prices = product.prices.len(),
                "Multiple prices found, using the first one"
            );
            self.warnings.record(resource_type, PriceWarning::MultiplePrices);
        }

        let price = &product.prices[0];
        let amount = match price.amount(self.client.currency()) {
            Ok(amount) => amount,
            Err(e) => {
                warn!(
                    resource = %resource_name,
                    component = %component.name,
                    error = %e,
                    "Error converting price, using 0.00"
                );
                self.warnings.record(resource_type, PriceWarning::PriceConversion);
                Decimal::ZERO
            }
        };
        component.set_price(amount, Some(price.price_hash.clone()));
        true
    }

    fn missing_price(
        &self,
        resource_name: &str,
        resource_type: &str,
        component: &mut CostComponent,
        warning: PriceWarning,
    ) -> bool {
        if component.ignore_if_missing_price {
            debug!(
                resource = %resource_name,
                component = %component.name,
                "{warning}, removing cost component"
            );
            return false;
        }

        warn!(
            resource = %resource_name,
            component = %component.name,
            "{warning}, using 0.00"
        );
        self.warnings.record(resource_type, warning);
        component.set_price(Decimal::ZERO, None);
        true
    }
}
