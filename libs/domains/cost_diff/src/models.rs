use domain_pricing::{CostComponent, Resource, sum_costs};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use strum::Display;

/// How an entry changed between the past and current snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Added,
    Removed,
    Updated,
}

/// Cost difference, unset when it depends on usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostDelta {
    pub hourly: Option<Decimal>,
    pub monthly: Option<Decimal>,
}

impl CostDelta {
    /// Delta of an entry that only exists in the current snapshot
    pub fn added(hourly: Option<Decimal>, monthly: Option<Decimal>) -> Self {
        Self { hourly, monthly }
    }

    /// Delta of an entry that only exists in the past snapshot
    pub fn removed(hourly: Option<Decimal>, monthly: Option<Decimal>) -> Self {
        Self {
            hourly: hourly.map(|c| -c),
            monthly: monthly.map(|c| -c),
        }
    }

    /// Delta between two present entries, unset unless both costs are known
    pub fn updated(past: (Option<Decimal>, Option<Decimal>), current: (Option<Decimal>, Option<Decimal>)) -> Self {
        Self {
            hourly: difference(past.0, current.0),
            monthly: difference(past.1, current.1),
        }
    }

    pub fn between(kind: ChangeKind, past: (Option<Decimal>, Option<Decimal>), current: (Option<Decimal>, Option<Decimal>)) -> Self {
        match kind {
            ChangeKind::Added => Self::added(current.0, current.1),
            ChangeKind::Removed => Self::removed(past.0, past.1),
            ChangeKind::Updated => Self::updated(past, current),
        }
    }

    pub fn is_known(&self) -> bool {
        self.hourly.is_some() && self.monthly.is_some()
    }

    pub fn is_zero(&self) -> bool {
        self.hourly.is_some_and(|d| d.is_zero()) && self.monthly.is_some_and(|d| d.is_zero())
    }

    /// Sum of known deltas, unset only when all are unset
    pub fn sum<'a, I>(deltas: I) -> Self
    where
        I: IntoIterator<Item = &'a CostDelta> + Clone,
    {
        Self {
            hourly: sum_costs(deltas.clone().into_iter().map(|d| d.hourly)),
            monthly: sum_costs(deltas.into_iter().map(|d| d.monthly)),
        }
    }
}

fn difference(past: Option<Decimal>, current: Option<Decimal>) -> Option<Decimal> {
    current?.checked_sub(past?)
}

/// `(new / old - 1) * 100` rounded to a whole number, unset when either side
/// is unset or zero, or the ratio does not fit
pub fn percent_change(past: Option<Decimal>, current: Option<Decimal>) -> Option<Decimal> {
    let (past, current) = (past?, current?);
    if past.is_zero() || current.is_zero() {
        return None;
    }
    let change = current
        .checked_div(past)?
        .checked_sub(Decimal::ONE)?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    Some(change.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Alignment result for one cost component
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDiff<'a> {
    pub name: String,
    /// Name with changed labels shown as `old → new`
    pub display_name: String,
    pub unit: String,
    pub kind: ChangeKind,
    #[serde(skip)]
    pub past: Option<&'a CostComponent>,
    #[serde(skip)]
    pub current: Option<&'a CostComponent>,
    pub past_monthly_cost: Option<Decimal>,
    pub current_monthly_cost: Option<Decimal>,
    pub delta: CostDelta,
    pub percent_change: Option<Decimal>,
    pub depends_on_usage: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_delta: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_quantity_delta: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_quantity_delta: Option<Decimal>,
}

impl ComponentDiff<'_> {
    pub fn has_changes(&self) -> bool {
        match (self.past, self.current) {
            (Some(past), Some(current)) => {
                past.name != current.name
                    || past.price != current.price
                    || past.hourly_quantity != current.hourly_quantity
                    || past.monthly_quantity != current.monthly_quantity
                    || past.hourly_cost != current.hourly_cost
                    || past.monthly_cost != current.monthly_cost
            }
            _ => true,
        }
    }
}

/// Alignment result for one resource and its subtree
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDiff<'a> {
    pub name: String,
    pub resource_type: String,
    pub kind: ChangeKind,
    #[serde(skip)]
    pub past: Option<&'a Resource>,
    #[serde(skip)]
    pub current: Option<&'a Resource>,
    pub past_monthly_cost: Option<Decimal>,
    pub current_monthly_cost: Option<Decimal>,
    pub delta: CostDelta,
    pub percent_change: Option<Decimal>,
    pub depends_on_usage: bool,
    pub cost_components: Vec<ComponentDiff<'a>>,
    pub sub_resources: Vec<ResourceDiff<'a>>,
}

impl ResourceDiff<'_> {
    /// False only for updated resources whose whole subtree is unchanged
    pub fn has_changes(&self) -> bool {
        if self.kind != ChangeKind::Updated {
            return true;
        }
        let own_cost_changed = match (self.past, self.current) {
            (Some(past), Some(current)) => {
                past.hourly_cost != current.hourly_cost || past.monthly_cost != current.monthly_cost
            }
            _ => true,
        };
        own_cost_changed
            || self.cost_components.iter().any(ComponentDiff::has_changes)
            || self.sub_resources.iter().any(ResourceDiff::has_changes)
    }

    pub fn find_cost_component(&self, name: &str) -> Option<&ComponentDiff<'_>> {
        self.cost_components.iter().find(|c| c.name == name)
    }

    pub fn find_sub_resource(&self, name: &str) -> Option<&ResourceDiff<'_>> {
        self.sub_resources.iter().find(|r| r.name == name)
    }
}

/// Alignment of two project snapshots
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownDiff<'a> {
    pub project: String,
    pub past_total_monthly_cost: Option<Decimal>,
    pub current_total_monthly_cost: Option<Decimal>,
    /// Sum of the top level resource deltas
    pub total_delta: CostDelta,
    pub percent_change: Option<Decimal>,
    pub resources: Vec<ResourceDiff<'a>>,
}

impl<'a> BreakdownDiff<'a> {
    pub fn has_changes(&self) -> bool {
        self.resources.iter().any(ResourceDiff::has_changes)
    }

    /// Top level resources that were added, removed or changed in cost
    pub fn changed_resources(&self) -> impl Iterator<Item = &ResourceDiff<'a>> {
        self.resources.iter().filter(|r| r.has_changes())
    }

    pub fn find_resource(&self, name: &str) -> Option<&ResourceDiff<'a>> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// Alignment tuning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Match a renamed component by the text before ` (` when no exact name matches
    pub match_component_labels: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_change_rounding() {
        assert_eq!(percent_change(Some(dec!(10)), Some(dec!(15))), Some(dec!(50)));
        assert_eq!(percent_change(Some(dec!(3)), Some(dec!(4))), Some(dec!(33)));
        assert_eq!(percent_change(Some(dec!(8)), Some(dec!(9))), Some(dec!(13)));
        assert_eq!(percent_change(Some(dec!(8)), Some(dec!(7))), Some(dec!(-13)));
        assert_eq!(percent_change(Some(dec!(20)), Some(dec!(10))), Some(dec!(-50)));
    }

    #[test]
    fn test_percent_change_absent_for_zero_or_missing() {
        assert_eq!(percent_change(Some(Decimal::ZERO), Some(dec!(5))), None);
        assert_eq!(percent_change(Some(dec!(5)), Some(Decimal::ZERO)), None);
        assert_eq!(percent_change(None, Some(dec!(5))), None);
        assert_eq!(percent_change(Some(dec!(5)), None), None);
    }

    #[test]
    fn test_overflowing_delta_is_unset() {
        let tiny = Decimal::new(1, 28);
        assert_eq!(percent_change(Some(tiny), Some(Decimal::MAX)), None);

        let delta = CostDelta::updated((Some(Decimal::MIN), Some(dec!(1))), (Some(Decimal::MAX), Some(dec!(3))));
        assert_eq!(delta.hourly, None);
        assert_eq!(delta.monthly, Some(dec!(2)));
    }

    #[test]
    fn test_cost_delta_kinds() {
        let past = (Some(dec!(1)), Some(dec!(730)));
        let current = (Some(dec!(2)), Some(dec!(1460)));

        let updated = CostDelta::between(ChangeKind::Updated, past, current);
        assert_eq!(updated.monthly, Some(dec!(730)));

        let removed = CostDelta::between(ChangeKind::Removed, past, (None, None));
        assert_eq!(removed.monthly, Some(dec!(-730)));

        let added = CostDelta::between(ChangeKind::Added, (None, None), current);
        assert_eq!(added.hourly, Some(dec!(2)));
    }

    #[test]
    fn test_updated_delta_needs_both_sides() {
        let delta = CostDelta::updated((None, None), (Some(dec!(1)), Some(dec!(730))));
        assert!(!delta.is_known());
        assert!(!delta.is_zero());
    }

    #[test]
    fn test_change_kind_serialization() {
        assert_eq!(ChangeKind::Added.to_string(), "ADDED");
        assert_eq!(serde_json::to_value(ChangeKind::Removed).unwrap(), "REMOVED");
    }
}
