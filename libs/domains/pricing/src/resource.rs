//! Resource tree: resources, their cost components and project snapshots.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{PriceFilter, ProductFilter};

fn default_unit_multiplier() -> Decimal {
    Decimal::ONE
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single priced line item of a resource, e.g. "Instance usage (Linux/UNIX, on-demand, t3.small)".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComponent {
    /// Unique among the components of the parent resource
    pub name: String,
    pub unit: String,
    #[serde(default = "default_unit_multiplier")]
    pub unit_multiplier: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_quantity: Option<Decimal>,
    /// Fraction in `0..=1` taken off both hourly and monthly cost
    #[serde(default, skip_serializing_if = "Decimal::is_zero")]
    pub monthly_discount_perc: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_filter: Option<ProductFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_filter: Option<PriceFilter>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_hash: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_if_missing_price: bool,
    #[serde(default)]
    pub hourly_cost: Option<Decimal>,
    #[serde(default)]
    pub monthly_cost: Option<Decimal>,
}

impl CostComponent {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            unit_multiplier: Decimal::ONE,
            hourly_quantity: None,
            monthly_quantity: None,
            monthly_discount_perc: Decimal::ZERO,
            product_filter: None,
            price_filter: None,
            price: Decimal::ZERO,
            custom_price: None,
            price_hash: None,
            ignore_if_missing_price: false,
            hourly_cost: None,
            monthly_cost: None,
        }
    }

    /// Whether the catalog has to be asked for this component's price
    pub fn needs_lookup(&self) -> bool {
        self.custom_price.is_none() && self.product_filter.is_some()
    }

    pub fn set_price(&mut self, price: Decimal, price_hash: Option<String>) {
        self.price = price;
        self.price_hash = price_hash;
    }
}

/// An infrastructure resource, addressed by name within its parent scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// Unsupported resources are carried along but never priced
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_skipped: bool,
    /// Free resources, nothing to look up
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_price: bool,
    #[serde(default)]
    pub cost_components: Vec<CostComponent>,
    #[serde(default)]
    pub sub_resources: Vec<Resource>,
    #[serde(default)]
    pub hourly_cost: Option<Decimal>,
    #[serde(default)]
    pub monthly_cost: Option<Decimal>,
    /// Set when some descendant cost could not be computed without usage data
    #[serde(default, skip_serializing_if = "is_false")]
    pub usage_dependent: bool,
}

impl Resource {
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    /// Whether the resolver should look at this resource at all
    pub fn is_priceable(&self) -> bool {
        !self.is_skipped && !self.no_price
    }

    /// All nested sub resources, depth first, parents before children
    pub fn flattened_sub_resources(&self) -> Vec<&Resource> {
        let mut out = Vec::new();
        for sub in &self.sub_resources {
            out.push(sub);
            out.extend(sub.flattened_sub_resources());
        }
        out
    }

    /// Number of cost components in this resource and its whole subtree
    pub fn component_count(&self) -> usize {
        self.cost_components.len()
            + self
                .sub_resources
                .iter()
                .map(Resource::component_count)
                .sum::<usize>()
    }

    pub fn find_cost_component(&self, name: &str) -> Option<&CostComponent> {
        self.cost_components.iter().find(|c| c.name == name)
    }

    pub fn find_sub_resource(&self, name: &str) -> Option<&Resource> {
        self.sub_resources.iter().find(|r| r.name == name)
    }
}

/// Project as handed over by the infrastructure parser, filters populated but unpriced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Project {
    pub fn new(name: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self {
            name: name.into(),
            resources,
        }
    }
}

/// One fully costed project snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub total_hourly_cost: Option<Decimal>,
    #[serde(default)]
    pub total_monthly_cost: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cost_component_defaults_from_json() {
        let component: CostComponent = serde_json::from_str(
            r#"{"name": "Storage", "unit": "GB", "monthlyQuantity": "20"}"#,
        )
        .unwrap();

        assert_eq!(component.unit_multiplier, Decimal::ONE);
        assert_eq!(component.monthly_quantity, Some(dec!(20)));
        assert_eq!(component.price, Decimal::ZERO);
        assert!(!component.ignore_if_missing_price);
        assert!(!component.needs_lookup(), "no product filter means nothing to look up");
    }

    #[test]
    fn test_custom_price_never_needs_lookup() {
        let mut component = CostComponent::new("Compute", "hours");
        component.product_filter = Some(ProductFilter::default());
        assert!(component.needs_lookup());

        component.custom_price = Some(dec!(1.5));
        assert!(!component.needs_lookup());
    }

    #[test]
    fn test_flattened_sub_resources_depth_first() {
        let mut root = Resource::new("aws_instance.web", "aws_instance");
        let mut volume = Resource::new("root_block_device", "");
        volume.sub_resources.push(Resource::new("snapshot", ""));
        root.sub_resources.push(volume);
        root.sub_resources.push(Resource::new("ebs_block_device[0]", ""));

        let names: Vec<_> = root
            .flattened_sub_resources()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["root_block_device", "snapshot", "ebs_block_device[0]"]);
    }

    #[test]
    fn test_component_count_includes_subtree() {
        let mut root = Resource::new("aws_instance.web", "aws_instance");
        root.cost_components.push(CostComponent::new("Compute", "hours"));
        let mut volume = Resource::new("root_block_device", "");
        volume.cost_components.push(CostComponent::new("Storage", "GB"));
        volume.cost_components.push(CostComponent::new("IOPS", "IOPS"));
        root.sub_resources.push(volume);

        assert_eq!(root.component_count(), 3);
        assert!(root.find_sub_resource("root_block_device").is_some());
        assert!(root.find_cost_component("Storage").is_none());
    }
}
