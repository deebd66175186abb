//! Subcommand handlers

use clap::Args;
use domain_cost_diff::{DiffOptions, diff_breakdowns_with};
use domain_pricing::{Breakdown, CatalogTransport, Project};
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::info;

use crate::estimator::{CostEstimator, breakdown_priced};
use crate::io::{read_json, write_json};

#[derive(Args, Debug, Clone)]
pub struct BreakdownArgs {
    /// Project JSON document with resources and their price filters
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the breakdown here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Inputs already carry prices, skip catalog lookups
    #[arg(long)]
    pub priced: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// Project JSON document of the past snapshot
    #[arg(long)]
    pub past: PathBuf,

    /// Project JSON document of the current snapshot
    #[arg(long)]
    pub current: PathBuf,

    /// Write the diff here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Inputs already carry prices, skip catalog lookups
    #[arg(long)]
    pub priced: bool,

    /// Only report resources that were added, removed or changed
    #[arg(long)]
    pub changed_only: bool,

    /// Match renamed cost components by the text before their labels
    #[arg(long)]
    pub match_labels: bool,
}

impl BreakdownArgs {
    /// Whether this run talks to the catalog
    pub fn needs_catalog(&self) -> bool {
        !self.priced
    }
}

impl DiffArgs {
    pub fn needs_catalog(&self) -> bool {
        !self.priced
    }
}

async fn load_breakdown<T: CatalogTransport + 'static>(
    project: Project,
    priced: bool,
    estimator: &CostEstimator<T>,
) -> Result<Breakdown> {
    if priced {
        return Ok(breakdown_priced(project));
    }
    estimator
        .breakdown(project)
        .await
        .wrap_err("Failed to resolve prices")
}

pub async fn breakdown<T: CatalogTransport + 'static>(
    args: &BreakdownArgs,
    estimator: &CostEstimator<T>,
) -> Result<Breakdown> {
    let project: Project = read_json(&args.input)?;
    let breakdown = load_breakdown(project, args.priced, estimator).await?;

    info!(
        project = %breakdown.project,
        resources = breakdown.resources.len(),
        monthly_cost = ?breakdown.total_monthly_cost,
        "Breakdown complete"
    );
    write_json(args.output.as_deref(), &breakdown)?;
    Ok(breakdown)
}

pub async fn diff<T: CatalogTransport + 'static>(args: &DiffArgs, estimator: &CostEstimator<T>) -> Result<()> {
    let past: Project = read_json(&args.past)?;
    let current: Project = read_json(&args.current)?;

    let (past, current) = if args.priced {
        (breakdown_priced(past), breakdown_priced(current))
    } else {
        estimator
            .breakdown_pair(past, current)
            .await
            .wrap_err("Failed to resolve prices")?
    };

    let options = DiffOptions {
        match_component_labels: args.match_labels,
    };
    let mut diff = diff_breakdowns_with(&past, &current, &options);
    info!(
        project = %diff.project,
        changed = diff.changed_resources().count(),
        monthly_delta = ?diff.total_delta.monthly,
        "Diff complete"
    );

    if args.changed_only {
        diff.resources.retain(|r| r.has_changes());
    }
    write_json(args.output.as_deref(), &diff)
}
