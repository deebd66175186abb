//! Cost calculator
//!
//! Derives hourly and monthly costs from quantities, prices and unit
//! multipliers, then rolls them up through the resource tree.

use rust_decimal::Decimal;
use tracing::warn;

use crate::resource::{Breakdown, CostComponent, Project, Resource};

/// Hours in an average month
pub const HOURS_PER_MONTH: Decimal = Decimal::from_parts(730, 0, 0, false, 0);

impl CostComponent {
    /// Fill the non-authoritative quantity from the authoritative one.
    ///
    /// When both are set each stays authoritative for its own period.
    pub fn fill_quantities(&mut self) {
        match (self.hourly_quantity, self.monthly_quantity) {
            (None, Some(monthly)) => self.hourly_quantity = monthly.checked_div(HOURS_PER_MONTH),
            (Some(hourly), None) => self.monthly_quantity = hourly.checked_mul(HOURS_PER_MONTH),
            _ => {}
        }
    }

    /// Compute hourly and monthly cost. A missing quantity leaves the cost unset,
    /// as does a product too large to represent.
    pub fn calculate_costs(&mut self) {
        self.fill_quantities();

        let rate = Decimal::ONE
            .checked_sub(self.monthly_discount_perc)
            .and_then(|d| self.price.checked_mul(self.unit_multiplier)?.checked_mul(d));
        let cost = |quantity: Option<Decimal>| {
            let quantity = quantity?;
            let cost = rate.and_then(|r| r.checked_mul(quantity));
            if cost.is_none() {
                warn!(component = %self.name, price = %self.price, "Cost overflows, leaving it unset");
            }
            cost
        };
        self.hourly_cost = cost(self.hourly_quantity);
        self.monthly_cost = cost(self.monthly_quantity);
    }
}

impl Resource {
    /// Compute the costs of every component and sub resource, then the aggregate.
    ///
    /// The aggregate stays unset only when nothing below the resource has a cost.
    pub fn calculate_costs(&mut self) {
        let mut hourly = Some(Decimal::ZERO);
        let mut monthly = Some(Decimal::ZERO);
        let mut has_cost = false;
        let mut usage_dependent = false;
        let mut add = |h: Option<Decimal>, m: Option<Decimal>| {
            has_cost = true;
            hourly = hourly.and_then(|acc| acc.checked_add(h.unwrap_or_default()));
            monthly = monthly.and_then(|acc| acc.checked_add(m.unwrap_or_default()));
        };

        for component in &mut self.cost_components {
            component.calculate_costs();
            match (component.hourly_cost, component.monthly_cost) {
                (None, None) => usage_dependent = true,
                (h, m) => add(h, m),
            }
        }

        for sub in &mut self.sub_resources {
            sub.calculate_costs();
            usage_dependent |= sub.usage_dependent;
            match (sub.hourly_cost, sub.monthly_cost) {
                (None, None) => usage_dependent |= sub.component_count() > 0,
                (h, m) => add(h, m),
            }
        }

        if has_cost {
            if hourly.is_none() || monthly.is_none() {
                warn!(resource = %self.name, "Aggregate cost overflows, leaving it unset");
            }
            self.hourly_cost = hourly;
            self.monthly_cost = monthly;
        } else {
            self.hourly_cost = None;
            self.monthly_cost = None;
        }
        self.usage_dependent = usage_dependent;
    }
}

/// Sum optional costs, unset when every input is unset or the sum overflows
pub fn sum_costs<I>(costs: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    let mut costs = costs.into_iter().flatten();
    let first = costs.next()?;
    costs.try_fold(first, |acc, cost| acc.checked_add(cost))
}

impl Breakdown {
    /// Calculate every resource and the project totals
    pub fn from_resources(project: impl Into<String>, mut resources: Vec<Resource>) -> Self {
        for resource in &mut resources {
            resource.calculate_costs();
        }

        let total_hourly_cost = sum_costs(resources.iter().map(|r| r.hourly_cost));
        let total_monthly_cost = sum_costs(resources.iter().map(|r| r.monthly_cost));

        Self {
            project: project.into(),
            resources,
            total_hourly_cost,
            total_monthly_cost,
        }
    }

    /// Recalculate after resources were modified in place
    pub fn recalculate(&mut self) {
        let resources = std::mem::take(&mut self.resources);
        let project = std::mem::take(&mut self.project);
        *self = Self::from_resources(project, resources);
    }

    /// Resources with at least one usage-dependent cost
    pub fn usage_dependent_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.usage_dependent)
    }
}

impl From<Project> for Breakdown {
    fn from(project: Project) -> Self {
        Breakdown::from_resources(project.name, project.resources)
    }
}
