//! Aligns a past and a current breakdown by name, level by level.
//!
//! Siblings are keyed by `(name, occurrence)` where occurrence counts earlier
//! siblings with the same name, so duplicated names pair up in order.
//! Output follows the current order, entries only found in the past are
//! appended in past order.

use domain_pricing::{Breakdown, CostComponent, Resource};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::models::{
    BreakdownDiff, ChangeKind, ComponentDiff, CostDelta, DiffOptions, ResourceDiff, percent_change,
};
use crate::naming::{merge_display_name, name_prefix};

enum Aligned<'a, T> {
    Added(&'a T),
    Removed(&'a T),
    Updated(&'a T, &'a T),
}

fn occurrence_keys<'a, T>(items: &'a [T], name: impl Fn(&'a T) -> &'a str) -> Vec<(&'a str, usize)> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    items
        .iter()
        .map(|item| {
            let name = name(item);
            let count = seen.entry(name).or_insert(0);
            let key = (name, *count);
            *count += 1;
            key
        })
        .collect()
}

/// Pair up one level of siblings.
///
/// `fallback` derives a secondary key from a name. A current entry left
/// without an exact counterpart takes the first unmatched past entry with
/// the same secondary key.
fn align<'a, T>(
    past: &'a [T],
    current: &'a [T],
    name: impl Fn(&'a T) -> &'a str + Copy,
    fallback: Option<fn(&str) -> Option<&str>>,
) -> Vec<Aligned<'a, T>> {
    let past_index: HashMap<(&str, usize), usize> = occurrence_keys(past, name)
        .into_iter()
        .enumerate()
        .map(|(i, key)| (key, i))
        .collect();

    let mut past_matched = vec![false; past.len()];
    let mut current_match: Vec<Option<usize>> = occurrence_keys(current, name)
        .iter()
        .map(|key| {
            let i = *past_index.get(key)?;
            past_matched[i] = true;
            Some(i)
        })
        .collect();

    if let Some(secondary) = fallback {
        let mut unmatched: HashMap<&str, VecDeque<usize>> = HashMap::new();
        for (i, p) in past.iter().enumerate() {
            if past_matched[i] {
                continue;
            }
            if let Some(key) = secondary(name(p)) {
                unmatched.entry(key).or_default().push_back(i);
            }
        }

        for (cur, slot) in current.iter().zip(current_match.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            let Some(key) = secondary(name(cur)) else {
                continue;
            };
            if let Some(i) = unmatched.get_mut(key).and_then(VecDeque::pop_front) {
                past_matched[i] = true;
                *slot = Some(i);
            }
        }
    }

    let mut aligned: Vec<Aligned<'a, T>> = current
        .iter()
        .zip(current_match)
        .map(|(cur, matched)| match matched {
            Some(i) => Aligned::Updated(&past[i], cur),
            None => Aligned::Added(cur),
        })
        .collect();

    aligned.extend(
        past.iter()
            .zip(past_matched)
            .filter(|(_, matched)| !matched)
            .map(|(p, _)| Aligned::Removed(p)),
    );

    aligned
}

fn diff_components<'a>(
    past: &'a [CostComponent],
    current: &'a [CostComponent],
    options: &DiffOptions,
) -> Vec<ComponentDiff<'a>> {
    let fallback: Option<fn(&str) -> Option<&str>> = if options.match_component_labels {
        Some(name_prefix)
    } else {
        None
    };

    align(past, current, |c: &CostComponent| c.name.as_str(), fallback)
        .into_iter()
        .map(|aligned| match aligned {
            Aligned::Added(c) => component_diff(ChangeKind::Added, None, Some(c)),
            Aligned::Removed(p) => component_diff(ChangeKind::Removed, Some(p), None),
            Aligned::Updated(p, c) => component_diff(ChangeKind::Updated, Some(p), Some(c)),
        })
        .collect()
}

fn component_diff<'a>(
    kind: ChangeKind,
    past: Option<&'a CostComponent>,
    current: Option<&'a CostComponent>,
) -> ComponentDiff<'a> {
    let costs = |c: Option<&CostComponent>| c.map_or((None, None), |c| (c.hourly_cost, c.monthly_cost));
    let delta = CostDelta::between(kind, costs(past), costs(current));
    let past_monthly_cost = past.and_then(|c| c.monthly_cost);
    let current_monthly_cost = current.and_then(|c| c.monthly_cost);

    let (name, unit, display_name) = match (past, current) {
        (Some(p), Some(c)) => (c.name.clone(), c.unit.clone(), merge_display_name(&p.name, &c.name)),
        (None, Some(c)) => (c.name.clone(), c.unit.clone(), c.name.clone()),
        (Some(p), None) => (p.name.clone(), p.unit.clone(), p.name.clone()),
        (None, None) => Default::default(),
    };

    let (price_delta, hourly_quantity_delta, monthly_quantity_delta) = match (past, current) {
        (Some(p), Some(c)) => (
            c.price.checked_sub(p.price),
            c.hourly_quantity.zip(p.hourly_quantity).and_then(|(c, p)| c.checked_sub(p)),
            c.monthly_quantity.zip(p.monthly_quantity).and_then(|(c, p)| c.checked_sub(p)),
        ),
        _ => (None, None, None),
    };

    ComponentDiff {
        name,
        display_name,
        unit,
        kind,
        past,
        current,
        past_monthly_cost,
        current_monthly_cost,
        delta,
        percent_change: percent_change(past_monthly_cost, current_monthly_cost),
        depends_on_usage: !delta.is_known(),
        price_delta,
        hourly_quantity_delta,
        monthly_quantity_delta,
    }
}

/// Align two lists of sibling resources and their subtrees
pub fn diff_resources<'a>(
    past: &'a [Resource],
    current: &'a [Resource],
    options: &DiffOptions,
) -> Vec<ResourceDiff<'a>> {
    align(past, current, |r: &Resource| r.name.as_str(), None)
        .into_iter()
        .map(|aligned| match aligned {
            Aligned::Added(c) => resource_diff(ChangeKind::Added, None, Some(c), options),
            Aligned::Removed(p) => resource_diff(ChangeKind::Removed, Some(p), None, options),
            Aligned::Updated(p, c) => resource_diff(ChangeKind::Updated, Some(p), Some(c), options),
        })
        .collect()
}

fn resource_diff<'a>(
    kind: ChangeKind,
    past: Option<&'a Resource>,
    current: Option<&'a Resource>,
    options: &DiffOptions,
) -> ResourceDiff<'a> {
    let costs = |r: Option<&Resource>| r.map_or((None, None), |r| (r.hourly_cost, r.monthly_cost));
    let delta = CostDelta::between(kind, costs(past), costs(current));
    let past_monthly_cost = past.and_then(|r| r.monthly_cost);
    let current_monthly_cost = current.and_then(|r| r.monthly_cost);

    let no_components: &[CostComponent] = &[];
    let no_resources: &[Resource] = &[];
    let cost_components = diff_components(
        past.map_or(no_components, |r| r.cost_components.as_slice()),
        current.map_or(no_components, |r| r.cost_components.as_slice()),
        options,
    );
    let sub_resources = diff_resources(
        past.map_or(no_resources, |r| r.sub_resources.as_slice()),
        current.map_or(no_resources, |r| r.sub_resources.as_slice()),
        options,
    );

    let base = current.or(past);
    ResourceDiff {
        name: base.map(|r| r.name.clone()).unwrap_or_default(),
        resource_type: base.map(|r| r.resource_type.clone()).unwrap_or_default(),
        kind,
        past,
        current,
        past_monthly_cost,
        current_monthly_cost,
        delta,
        percent_change: percent_change(past_monthly_cost, current_monthly_cost),
        depends_on_usage: !delta.is_known(),
        cost_components,
        sub_resources,
    }
}

/// Align two costed snapshots of a project
pub fn diff_breakdowns<'a>(past: &'a Breakdown, current: &'a Breakdown) -> BreakdownDiff<'a> {
    diff_breakdowns_with(past, current, &DiffOptions::default())
}

pub fn diff_breakdowns_with<'a>(
    past: &'a Breakdown,
    current: &'a Breakdown,
    options: &DiffOptions,
) -> BreakdownDiff<'a> {
    let resources = diff_resources(&past.resources, &current.resources, options);
    let total_delta = CostDelta::sum(resources.iter().map(|r| &r.delta));

    let count = |kind: ChangeKind| resources.iter().filter(|r| r.kind == kind).count();
    debug!(
        added = count(ChangeKind::Added),
        removed = count(ChangeKind::Removed),
        updated = count(ChangeKind::Updated),
        "Aligned breakdowns"
    );

    let project = if current.project.is_empty() {
        past.project.clone()
    } else {
        current.project.clone()
    };

    BreakdownDiff {
        project,
        past_total_monthly_cost: past.total_monthly_cost,
        current_total_monthly_cost: current.total_monthly_cost,
        total_delta,
        percent_change: percent_change(past.total_monthly_cost, current.total_monthly_cost),
        resources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_pricing::fixtures::{priced_component, resource, usage_component};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn breakdown(resources: Vec<Resource>) -> Breakdown {
        Breakdown::from_resources("demo", resources)
    }

    fn sample() -> Breakdown {
        let mut web = resource(
            "aws_instance.web",
            "aws_instance",
            vec![priced_component("Compute", dec!(10), dec!(1))],
        );
        web.sub_resources.push(resource(
            "root_block_device",
            "",
            vec![priced_component("Storage", dec!(0.1), dec!(30))],
        ));
        let db = resource(
            "aws_db_instance.db",
            "aws_db_instance",
            vec![priced_component("Database instance", dec!(25), dec!(1))],
        );
        breakdown(vec![web, db])
    }

    fn kinds<'a>(nodes: impl Iterator<Item = (&'a str, ChangeKind)>) -> Vec<(String, ChangeKind)> {
        nodes.map(|(n, k)| (n.to_string(), k)).collect()
    }

    fn names_with(diffs: &[ResourceDiff<'_>], wanted: &[ChangeKind]) -> BTreeSet<String> {
        diffs
            .iter()
            .filter(|d| wanted.contains(&d.kind))
            .map(|d| d.name.clone())
            .collect()
    }

    fn component_names_with(diffs: &[ComponentDiff<'_>], wanted: &[ChangeKind]) -> BTreeSet<String> {
        diffs
            .iter()
            .filter(|d| wanted.contains(&d.kind))
            .map(|d| d.name.clone())
            .collect()
    }

    fn assert_complete(past: &[Resource], current: &[Resource], diffs: &[ResourceDiff<'_>]) {
        let past_names: BTreeSet<_> = past.iter().map(|r| r.name.clone()).collect();
        let current_names: BTreeSet<_> = current.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names_with(diffs, &[ChangeKind::Added, ChangeKind::Updated]), current_names);
        assert_eq!(names_with(diffs, &[ChangeKind::Removed, ChangeKind::Updated]), past_names);

        for diff in diffs {
            let past_components: BTreeSet<_> = diff
                .past
                .map(|r| r.cost_components.iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default();
            let current_components: BTreeSet<_> = diff
                .current
                .map(|r| r.cost_components.iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default();
            assert_eq!(
                component_names_with(&diff.cost_components, &[ChangeKind::Added, ChangeKind::Updated]),
                current_components
            );
            assert_eq!(
                component_names_with(&diff.cost_components, &[ChangeKind::Removed, ChangeKind::Updated]),
                past_components
            );

            let no_resources: &[Resource] = &[];
            assert_complete(
                diff.past.map_or(no_resources, |r| r.sub_resources.as_slice()),
                diff.current.map_or(no_resources, |r| r.sub_resources.as_slice()),
                &diff.sub_resources,
            );
        }
    }

    #[test]
    fn test_self_diff_is_all_updated_with_zero_delta() {
        let snapshot = sample();
        let diff = diff_breakdowns(&snapshot, &snapshot);

        fn check(diffs: &[ResourceDiff<'_>]) {
            for d in diffs {
                assert_eq!(d.kind, ChangeKind::Updated);
                assert!(d.delta.is_zero(), "{} should not change", d.name);
                for c in &d.cost_components {
                    assert_eq!(c.kind, ChangeKind::Updated);
                    assert!(c.delta.is_zero());
                    assert_eq!(c.price_delta, Some(Decimal::ZERO));
                }
                check(&d.sub_resources);
            }
        }
        check(&diff.resources);

        assert!(diff.total_delta.is_zero());
        assert!(!diff.has_changes());
        assert_eq!(diff.changed_resources().count(), 0);
        assert_eq!(diff.percent_change, Some(Decimal::ZERO));
    }

    #[test]
    fn test_updated_component_and_added_volume() {
        let past = breakdown(vec![resource(
            "aws_instance.a",
            "aws_instance",
            vec![priced_component("Compute", dec!(10), dec!(1))],
        )]);

        let mut instance = resource(
            "aws_instance.a",
            "aws_instance",
            vec![priced_component("Compute", dec!(15), dec!(1))],
        );
        instance.sub_resources.push(resource(
            "ebs_block_device[0]",
            "",
            vec![priced_component("Storage", dec!(0.1), dec!(20))],
        ));
        let current = breakdown(vec![instance]);

        let diff = diff_breakdowns(&past, &current);
        let node = diff.find_resource("aws_instance.a").unwrap();
        assert_eq!(node.kind, ChangeKind::Updated);
        assert_eq!(node.delta.monthly, Some(dec!(7)));

        let compute = node.find_cost_component("Compute").unwrap();
        assert_eq!(compute.kind, ChangeKind::Updated);
        assert_eq!(compute.delta.monthly, Some(dec!(5)));
        assert_eq!(compute.percent_change, Some(dec!(50)));
        assert_eq!(compute.price_delta, Some(dec!(5)));

        let ebs = node.find_sub_resource("ebs_block_device[0]").unwrap();
        assert_eq!(ebs.kind, ChangeKind::Added);
        assert_eq!(ebs.delta.monthly, Some(dec!(2.0)));
        assert_eq!(ebs.past_monthly_cost, None);
        assert_eq!(ebs.percent_change, None);

        assert_eq!(diff.total_delta.monthly, Some(dec!(7)));
        assert_eq!(diff.changed_resources().count(), 1);
    }

    #[test]
    fn test_updated_component_and_added_component() {
        let past = breakdown(vec![resource(
            "aws_instance.a",
            "aws_instance",
            vec![priced_component("Compute", dec!(10), dec!(1))],
        )]);
        let current = breakdown(vec![resource(
            "aws_instance.a",
            "aws_instance",
            vec![
                priced_component("Compute", dec!(15), dec!(1)),
                priced_component("EBS", dec!(2), dec!(1)),
            ],
        )]);

        let diff = diff_breakdowns(&past, &current);
        let node = diff.find_resource("aws_instance.a").unwrap();
        assert_eq!(node.kind, ChangeKind::Updated);
        assert_eq!(node.delta.monthly, Some(dec!(7)));

        let compute = node.find_cost_component("Compute").unwrap();
        assert_eq!(compute.kind, ChangeKind::Updated);
        assert_eq!(compute.delta.monthly, Some(dec!(5)));
        assert_eq!(compute.percent_change, Some(dec!(50)));

        let ebs = node.find_cost_component("EBS").unwrap();
        assert_eq!(ebs.kind, ChangeKind::Added);
        assert_eq!(ebs.delta.monthly, Some(dec!(2)));
        assert_eq!(ebs.percent_change, None);

        let names: Vec<_> = node.cost_components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Compute", "EBS"]);
    }

    #[test]
    fn test_removed_resource() {
        let past = breakdown(vec![resource(
            "aws_instance.old",
            "aws_instance",
            vec![priced_component("Compute", dec!(20), dec!(1))],
        )]);
        let current = breakdown(vec![]);

        let diff = diff_breakdowns(&past, &current);
        assert_eq!(diff.resources.len(), 1);
        let node = &diff.resources[0];
        assert_eq!(node.kind, ChangeKind::Removed);
        assert_eq!(node.delta.monthly, Some(dec!(-20)));
        assert_eq!(node.cost_components[0].kind, ChangeKind::Removed);
        assert_eq!(diff.total_delta.monthly, Some(dec!(-20)));
        assert_eq!(diff.current_total_monthly_cost, None);
    }

    #[test]
    fn test_removed_entries_follow_current_order() {
        let past = breakdown(vec![
            resource("a", "t", vec![]),
            resource("gone1", "t", vec![]),
            resource("b", "t", vec![]),
            resource("gone2", "t", vec![]),
        ]);
        let current = breakdown(vec![
            resource("new", "t", vec![]),
            resource("b", "t", vec![]),
            resource("a", "t", vec![]),
        ]);

        let diff = diff_breakdowns(&past, &current);
        let order = kinds(diff.resources.iter().map(|r| (r.name.as_str(), r.kind)));
        assert_eq!(
            order,
            kinds(
                [
                    ("new", ChangeKind::Added),
                    ("b", ChangeKind::Updated),
                    ("a", ChangeKind::Updated),
                    ("gone1", ChangeKind::Removed),
                    ("gone2", ChangeKind::Removed),
                ]
                .into_iter()
            )
        );
        assert_complete(&past.resources, &current.resources, &diff.resources);
    }

    #[test]
    fn test_completeness_on_mixed_trees() {
        let mut past_web = resource(
            "aws_instance.web",
            "aws_instance",
            vec![
                priced_component("Compute", dec!(10), dec!(1)),
                priced_component("CPU credits", dec!(1), dec!(2)),
            ],
        );
        past_web.sub_resources.push(resource(
            "root_block_device",
            "",
            vec![priced_component("Storage", dec!(0.1), dec!(30))],
        ));
        past_web.sub_resources.push(resource(
            "ebs_block_device[0]",
            "",
            vec![priced_component("Storage", dec!(0.1), dec!(10))],
        ));

        let mut current_web = resource(
            "aws_instance.web",
            "aws_instance",
            vec![
                priced_component("Compute", dec!(12), dec!(1)),
                usage_component("Data transfer", dec!(0.09)),
            ],
        );
        current_web.sub_resources.push(resource(
            "root_block_device",
            "",
            vec![
                priced_component("Storage", dec!(0.1), dec!(50)),
                priced_component("Provisioned IOPS", dec!(0.065), dec!(100)),
            ],
        ));

        let past = breakdown(vec![past_web, resource("aws_eip.ip", "aws_eip", vec![])]);
        let current = breakdown(vec![
            current_web,
            resource(
                "aws_lambda_function.fn",
                "aws_lambda_function",
                vec![usage_component("Requests", dec!(0.2))],
            ),
        ]);

        let diff = diff_breakdowns(&past, &current);
        assert_complete(&past.resources, &current.resources, &diff.resources);

        let web = diff.find_resource("aws_instance.web").unwrap();
        let transfer = web.find_cost_component("Data transfer").unwrap();
        assert_eq!(transfer.kind, ChangeKind::Added);
        assert!(transfer.depends_on_usage);
        assert_eq!(transfer.delta.monthly, None);

        let lambda = diff.find_resource("aws_lambda_function.fn").unwrap();
        assert!(lambda.depends_on_usage);
        assert_eq!(lambda.current_monthly_cost, None);
    }

    #[test]
    fn test_duplicate_names_pair_by_occurrence() {
        let past = breakdown(vec![
            resource("dup", "t", vec![priced_component("Compute", dec!(1), dec!(1))]),
            resource("dup", "t", vec![priced_component("Compute", dec!(2), dec!(1))]),
        ]);
        let current = breakdown(vec![
            resource("dup", "t", vec![priced_component("Compute", dec!(1), dec!(1))]),
            resource("dup", "t", vec![priced_component("Compute", dec!(5), dec!(1))]),
            resource("dup", "t", vec![priced_component("Compute", dec!(7), dec!(1))]),
        ]);

        let diff = diff_breakdowns(&past, &current);
        let kinds: Vec<_> = diff.resources.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Updated, ChangeKind::Updated, ChangeKind::Added]);
        assert_eq!(diff.resources[0].delta.monthly, Some(Decimal::ZERO));
        assert_eq!(diff.resources[1].delta.monthly, Some(dec!(3)));
        assert_eq!(diff.resources[2].delta.monthly, Some(dec!(7)));
    }

    #[test]
    fn test_usage_dependent_update_has_no_delta() {
        let past = breakdown(vec![resource(
            "aws_lambda_function.fn",
            "aws_lambda_function",
            vec![usage_component("Requests", dec!(0.2))],
        )]);
        let current = breakdown(vec![resource(
            "aws_lambda_function.fn",
            "aws_lambda_function",
            vec![priced_component("Requests", dec!(0.2), dec!(10))],
        )]);

        let diff = diff_breakdowns(&past, &current);
        let requests = &diff.resources[0].cost_components[0];
        assert_eq!(requests.kind, ChangeKind::Updated);
        assert!(requests.depends_on_usage);
        assert_eq!(requests.delta.monthly, None);
        assert_eq!(requests.monthly_quantity_delta, None);
        assert!(requests.has_changes());
    }

    #[test]
    fn test_label_matching_is_opt_in() {
        let past = breakdown(vec![resource(
            "aws_instance.web",
            "aws_instance",
            vec![priced_component("Instance usage (Linux/UNIX, on-demand, t3.small)", dec!(15), dec!(1))],
        )]);
        let current = breakdown(vec![resource(
            "aws_instance.web",
            "aws_instance",
            vec![priced_component("Instance usage (Linux/UNIX, on-demand, t3.medium)", dec!(30), dec!(1))],
        )]);

        let exact = diff_breakdowns(&past, &current);
        let kinds: Vec<_> = exact.resources[0].cost_components.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Added, ChangeKind::Removed]);

        let options = DiffOptions {
            match_component_labels: true,
        };
        let merged = diff_breakdowns_with(&past, &current, &options);
        let components = &merged.resources[0].cost_components;
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].kind, ChangeKind::Updated);
        assert_eq!(components[0].delta.monthly, Some(dec!(15)));
        assert_eq!(components[0].percent_change, Some(dec!(100)));
        assert_eq!(
            components[0].display_name,
            "Instance usage (Linux/UNIX, on-demand, t3.small → t3.medium)"
        );
    }

    #[test]
    fn test_label_matching_pairs_in_past_order() {
        let past = breakdown(vec![resource(
            "aws_instance.web",
            "aws_instance",
            vec![
                priced_component("Storage (gp2)", dec!(1), dec!(10)),
                priced_component("Compute", dec!(5), dec!(1)),
                priced_component("Storage (io1)", dec!(2), dec!(10)),
                priced_component("IOPS (io1)", dec!(1), dec!(1)),
            ],
        )]);
        let current = breakdown(vec![resource(
            "aws_instance.web",
            "aws_instance",
            vec![
                priced_component("Compute", dec!(5), dec!(1)),
                priced_component("Storage (gp3)", dec!(1), dec!(10)),
                priced_component("Storage (gp3, encrypted)", dec!(3), dec!(10)),
                priced_component("Throughput (gp3)", dec!(1), dec!(1)),
            ],
        )]);

        let options = DiffOptions {
            match_component_labels: true,
        };
        let diff = diff_breakdowns_with(&past, &current, &options);
        let components = &diff.resources[0].cost_components;
        let pairs: Vec<_> = components
            .iter()
            .map(|c| (c.past.map(|p| p.name.as_str()), c.current.map(|c| c.name.as_str()), c.kind))
            .collect();

        assert_eq!(
            pairs,
            [
                (Some("Compute"), Some("Compute"), ChangeKind::Updated),
                (Some("Storage (gp2)"), Some("Storage (gp3)"), ChangeKind::Updated),
                (Some("Storage (io1)"), Some("Storage (gp3, encrypted)"), ChangeKind::Updated),
                (None, Some("Throughput (gp3)"), ChangeKind::Added),
                (Some("IOPS (io1)"), None, ChangeKind::Removed),
            ]
        );
        assert_eq!(components[2].delta.monthly, Some(dec!(10)));
    }

    #[test]
    fn test_serialized_diff_skips_references() {
        let snapshot = sample();
        let diff = diff_breakdowns(&snapshot, &snapshot);
        let json = serde_json::to_value(&diff).unwrap();

        assert_eq!(json["resources"][0]["kind"], "UPDATED");
        assert!(json["resources"][0].get("past").is_none());
        assert_eq!(json["resources"][0]["costComponents"][0]["name"], "Compute");
    }
}
