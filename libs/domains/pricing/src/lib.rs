//! Pricing Domain
//!
//! Resolves cloud resource prices against a GraphQL pricing catalog and
//! calculates hourly and monthly costs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Resolver   │  ← Worker pool, price selection policy, warnings
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Client    │  ← Batching, deduplication, cache
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Transport  │  ← HTTP (trait + implementations)
//! └─────────────┘
//! ```
//!
//! Resolved resources go through the [`calculator`] to produce a
//! [`Breakdown`].

pub mod cache;
pub mod calculator;
pub mod client;
pub mod error;
pub mod http;
pub mod models;
pub mod query;
pub mod resolver;
pub mod resource;
pub mod warnings;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

// Re-export commonly used types
pub use cache::PriceCache;
pub use calculator::{HOURS_PER_MONTH, sum_costs};
pub use client::{CatalogTransport, PriceCatalogClient};
pub use error::{ErrorKind, PricingError, PricingResult};
pub use http::HttpCatalogTransport;
pub use models::{AttributeFilter, PriceFilter, ProductFilter};
pub use query::{CatalogResult, GraphQLQuery, PriceQuery};
pub use resolver::{PriceResolver, default_worker_count};
pub use resource::{Breakdown, CostComponent, Project, Resource};
pub use warnings::{PriceWarning, ResourceWarnings};
