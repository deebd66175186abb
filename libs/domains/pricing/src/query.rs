//! GraphQL queries sent to the pricing catalog and the results it returns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::{PriceFilter, ProductFilter};

/// One price lookup: what to ask the catalog and in which currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub product_filter: ProductFilter,
    pub price_filter: Option<PriceFilter>,
    pub currency: String,
}

impl PriceQuery {
    pub fn new(
        product_filter: ProductFilter,
        price_filter: Option<PriceFilter>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            product_filter,
            price_filter,
            currency: currency.into(),
        }
    }

    /// Stable content hash used as the cache key.
    ///
    /// Derived from the serialized query, so it does not change between runs
    /// or processes the way `std::hash` output may.
    pub fn cache_key(&self) -> String {
        // serializing plain structs into a Vec cannot fail
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("{:x}", Sha256::digest(&bytes))
    }

    pub fn to_graphql(&self) -> GraphQLQuery {
        GraphQLQuery {
            query: format!(
                r#"
        query($productFilter: ProductFilter!, $priceFilter: PriceFilter) {{
            products(filter: $productFilter) {{
                prices(filter: $priceFilter) {{
                    priceHash
                    {}
                }}
            }}
        }}
    "#,
                self.currency
            ),
            variables: QueryVariables {
                product_filter: self.product_filter.clone(),
                price_filter: self.price_filter.clone(),
            },
        }
    }
}

/// One `{query, variables}` entry of a batched request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLQuery {
    pub query: String,
    pub variables: QueryVariables,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariables {
    pub product_filter: ProductFilter,
    pub price_filter: Option<PriceFilter>,
}

/// Result of one query, in the order the queries were sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogResult {
    #[serde(default)]
    pub data: Option<CatalogData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default)]
    pub prices: Vec<CatalogPrice>,
}

/// A price record: its hash plus one amount per requested currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPrice {
    #[serde(default)]
    pub price_hash: String,
    #[serde(flatten)]
    pub amounts: BTreeMap<String, serde_json::Value>,
}

impl CatalogResult {
    pub fn products(&self) -> &[CatalogProduct] {
        self.data.as_ref().map(|d| d.products.as_slice()).unwrap_or_default()
    }

    /// Build a result holding one product per entry, each with the given prices
    pub fn from_products(products: Vec<CatalogProduct>) -> Self {
        Self {
            data: Some(CatalogData { products }),
        }
    }
}

impl CatalogProduct {
    pub fn has_prices(&self) -> bool {
        !self.prices.is_empty()
    }
}

impl CatalogPrice {
    pub fn new(price_hash: impl Into<String>, currency: &str, amount: &str) -> Self {
        Self {
            price_hash: price_hash.into(),
            amounts: BTreeMap::from([(
                currency.to_string(),
                serde_json::Value::String(amount.to_string()),
            )]),
        }
    }

    /// Amount in `currency`, accepting both string and number encodings
    pub fn amount(&self, currency: &str) -> Result<Decimal, String> {
        match self.amounts.get(currency) {
            Some(serde_json::Value::String(raw)) => {
                Decimal::from_str(raw.trim()).map_err(|e| format!("'{raw}': {e}"))
            }
            Some(serde_json::Value::Number(n)) => {
                let raw = n.to_string();
                Decimal::from_str(&raw)
                    .or_else(|_| Decimal::from_scientific(&raw))
                    .map_err(|e| format!("'{raw}': {e}"))
            }
            Some(other) => Err(format!("unexpected value {other}")),
            None => Err(format!("no {currency} amount")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttributeFilter;
    use rust_decimal_macros::dec;

    fn query(instance_type: &str) -> PriceQuery {
        PriceQuery::new(
            ProductFilter {
                vendor_name: "aws".to_string(),
                service: Some("AmazonEC2".to_string()),
                attribute_filters: vec![AttributeFilter::exact("instanceType", instance_type)],
                ..Default::default()
            },
            Some(PriceFilter {
                purchase_option: Some("on_demand".to_string()),
                ..Default::default()
            }),
            "USD",
        )
    }

    #[test]
    fn test_cache_key_is_stable_and_distinct() {
        assert_eq!(query("t3.small").cache_key(), query("t3.small").cache_key());
        assert_ne!(query("t3.small").cache_key(), query("t3.large").cache_key());

        let mut eur = query("t3.small");
        eur.currency = "EUR".to_string();
        assert_ne!(eur.cache_key(), query("t3.small").cache_key());
        assert_eq!(eur.cache_key().len(), 64);
    }

    #[test]
    fn test_graphql_query_requests_currency() {
        let gql = query("t3.small").to_graphql();
        assert!(gql.query.contains("priceHash"));
        assert!(gql.query.contains("USD"));

        let body = serde_json::to_value(vec![gql]).unwrap();
        assert_eq!(body[0]["variables"]["productFilter"]["vendorName"], "aws");
        assert_eq!(body[0]["variables"]["priceFilter"]["purchaseOption"], "on_demand");
    }

    #[test]
    fn test_catalog_result_parsing() {
        let result: CatalogResult = serde_json::from_str(
            r#"{"data": {"products": [{"prices": [{"priceHash": "abc-123", "USD": "0.0208"}]}]}}"#,
        )
        .unwrap();

        let price = &result.products()[0].prices[0];
        assert_eq!(price.price_hash, "abc-123");
        assert_eq!(price.amount("USD").unwrap(), dec!(0.0208));
        assert!(price.amount("EUR").is_err());
    }

    #[test]
    fn test_missing_data_means_no_products() {
        let result: CatalogResult = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(result.products().is_empty());

        let result: CatalogResult = serde_json::from_str(r#"{}"#).unwrap();
        assert!(result.products().is_empty());
    }

    #[test]
    fn test_amount_accepts_numbers_and_rejects_garbage() {
        let mut price = CatalogPrice::new("h", "USD", "not-a-number");
        assert!(price.amount("USD").is_err());

        price
            .amounts
            .insert("USD".to_string(), serde_json::json!(0.5));
        assert_eq!(price.amount("USD").unwrap(), dec!(0.5));
    }
}
