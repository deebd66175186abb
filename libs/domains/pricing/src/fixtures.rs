//! Builders for resource trees and catalog responses used in tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::client::CatalogTransport;
use crate::error::PricingResult;
use crate::models::{AttributeFilter, PriceFilter, ProductFilter};
use crate::query::{CatalogPrice, CatalogProduct, CatalogResult, GraphQLQuery};
use crate::resource::{CostComponent, Resource};

/// Hourly component looked up by `sku`
pub fn component(name: &str, sku: &str) -> CostComponent {
    let mut component = CostComponent::new(name, "hours");
    component.hourly_quantity = Some(Decimal::ONE);
    component.product_filter = Some(ProductFilter {
        vendor_name: "aws".to_string(),
        service: Some("AmazonEC2".to_string()),
        region: Some("us-east-1".to_string()),
        sku: Some(sku.to_string()),
        attribute_filters: vec![AttributeFilter::exact("tenancy", "Shared")],
        ..Default::default()
    });
    component.price_filter = Some(PriceFilter {
        purchase_option: Some("on_demand".to_string()),
        ..Default::default()
    });
    component
}

/// Already priced component billed per month
pub fn priced_component(name: &str, price: Decimal, monthly_quantity: Decimal) -> CostComponent {
    let mut component = CostComponent::new(name, "months");
    component.price = price;
    component.monthly_quantity = Some(monthly_quantity);
    component
}

/// Component with no quantity, its cost depends on usage
pub fn usage_component(name: &str, price: Decimal) -> CostComponent {
    let mut component = CostComponent::new(name, "requests");
    component.price = price;
    component
}

pub fn resource(name: &str, resource_type: &str, cost_components: Vec<CostComponent>) -> Resource {
    let mut resource = Resource::new(name, resource_type);
    resource.cost_components = cost_components;
    resource
}

/// One product carrying the given `(price_hash, USD amount)` prices
pub fn catalog_result(prices: &[(&str, &str)]) -> CatalogResult {
    CatalogResult::from_products(vec![CatalogProduct {
        prices: prices
            .iter()
            .map(|(hash, amount)| CatalogPrice::new(*hash, "USD", amount))
            .collect(),
    }])
}

/// In-memory catalog answering by sku, unknown skus have no products
#[derive(Debug, Default)]
pub struct StaticCatalog {
    prices: HashMap<String, String>,
    requests: AtomicUsize,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, sku: &str, amount: &str) -> Self {
        self.prices.insert(sku.to_string(), amount.to_string());
        self
    }

    /// Number of batches received so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogTransport for StaticCatalog {
    async fn post_queries(&self, queries: &[GraphQLQuery]) -> PricingResult<Vec<CatalogResult>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(queries
            .iter()
            .map(|q| {
                let sku = q.variables.product_filter.sku.as_deref().unwrap_or_default();
                match self.prices.get(sku) {
                    Some(amount) => {
                        let hash = format!("hash-{sku}");
                        catalog_result(&[(hash.as_str(), amount.as_str())])
                    }
                    None => CatalogResult::from_products(vec![]),
                }
            })
            .collect())
    }
}
