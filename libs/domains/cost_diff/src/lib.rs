//! Cost Diff Domain
//!
//! Compares two costed snapshots of a project and reports, for every
//! resource, sub resource and cost component, whether it was added, removed
//! or updated along with the cost delta.
//!
//! ```rust,ignore
//! use domain_cost_diff::diff_breakdowns;
//!
//! let diff = diff_breakdowns(&past, &current);
//! for resource in diff.changed_resources() {
//!     println!("{} {:?}", resource.name, resource.delta.monthly);
//! }
//! ```

pub mod aligner;
pub mod models;
pub mod naming;

pub use aligner::{diff_breakdowns, diff_breakdowns_with, diff_resources};
pub use models::{
    BreakdownDiff, ChangeKind, ComponentDiff, CostDelta, DiffOptions, ResourceDiff, percent_change,
};
pub use naming::merge_display_name;
