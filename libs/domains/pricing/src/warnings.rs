//! Non-fatal price selection warnings, counted per resource type.

use dashmap::DashMap;
use observability::PricingMetrics;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Why a component did not get a single clean catalog price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
pub enum PriceWarning {
    #[strum(serialize = "No products found")]
    NoProducts,
    #[strum(serialize = "No prices found")]
    NoPrices,
    #[strum(serialize = "Multiple products found")]
    MultipleProducts,
    #[strum(serialize = "Multiple prices found")]
    MultiplePrices,
    #[strum(serialize = "Error converting price")]
    PriceConversion,
}

/// Concurrent warning counters shared by all resolver workers.
///
/// Serializes as `{resourceType: {message: count}}` with sorted keys.
#[derive(Debug, Default)]
pub struct ResourceWarnings {
    counts: DashMap<(String, PriceWarning), usize>,
}

impl ResourceWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, resource_type: &str, warning: PriceWarning) {
        *self
            .counts
            .entry((resource_type.to_string(), warning))
            .or_insert(0) += 1;
        PricingMetrics::record_price_warning(resource_type, &warning.to_string());
    }

    pub fn count(&self, resource_type: &str, warning: PriceWarning) -> usize {
        self.counts
            .get(&(resource_type.to_string(), warning))
            .map(|c| *c)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|e| *e.value()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&self) {
        self.counts.clear();
    }

    /// Point-in-time copy, ordered by resource type then message
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, usize>> {
        let mut out: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for entry in self.counts.iter() {
            let (resource_type, warning) = entry.key();
            out.entry(resource_type.clone())
                .or_default()
                .insert(warning.to_string(), *entry.value());
        }
        out
    }
}

impl Serialize for ResourceWarnings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;

    #[test]
    fn test_warning_messages() {
        assert_eq!(PriceWarning::NoProducts.to_string(), "No products found");
        assert_eq!(PriceWarning::PriceConversion.to_string(), "Error converting price");
        assert_eq!(
            PriceWarning::from_str("Multiple prices found").unwrap(),
            PriceWarning::MultiplePrices
        );
    }

    #[test]
    fn test_counts_per_resource_type() {
        let warnings = ResourceWarnings::new();
        warnings.record("aws_instance", PriceWarning::NoProducts);
        warnings.record("aws_instance", PriceWarning::NoProducts);
        warnings.record("aws_lambda_function", PriceWarning::NoPrices);

        assert_eq!(warnings.count("aws_instance", PriceWarning::NoProducts), 2);
        assert_eq!(warnings.count("aws_instance", PriceWarning::NoPrices), 0);
        assert_eq!(warnings.total(), 3);
    }

    #[test]
    fn test_serializes_nested_map() {
        let warnings = ResourceWarnings::new();
        warnings.record("aws_instance", PriceWarning::MultipleProducts);

        let json = serde_json::to_value(&warnings).unwrap();
        assert_eq!(json, serde_json::json!({"aws_instance": {"Multiple products found": 1}}));
    }

    #[test]
    fn test_concurrent_records() {
        let warnings = Arc::new(ResourceWarnings::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let warnings = warnings.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        warnings.record("aws_instance", PriceWarning::NoPrices);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(warnings.count("aws_instance", PriceWarning::NoPrices), 800);
    }
}
