use serde::{Deserialize, Serialize};

/// Matches one product attribute in the catalog.
///
/// Exactly one of `value` / `value_regex` is normally set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFilter {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_regex: Option<String>,
}

impl AttributeFilter {
    pub fn exact(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            value_regex: None,
        }
    }

    pub fn regex(key: impl Into<String>, value_regex: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            value_regex: Some(value_regex.into()),
        }
    }
}

/// Identifies a product in the pricing catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub vendor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_filters: Vec<AttributeFilter>,
}

/// Narrows the prices returned for a matched product
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_purchase_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_offering_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_usage_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_usage_amount: Option<String>,
}
