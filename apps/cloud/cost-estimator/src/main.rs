//! Cost Estimator CLI

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use cost_estimator::{BreakdownArgs, Config, CostEstimator, DiffArgs, commands, io};
use domain_pricing::PricingError;
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "cost-estimator")]
#[command(about = "Estimate cloud costs of infrastructure projects and diff them")]
struct Cli {
    /// Write Prometheus metrics of the run to this file
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a project and print its cost breakdown
    Breakdown(BreakdownArgs),

    /// Compare the costs of two snapshots of a project
    Diff(DiffArgs),
}

impl Commands {
    fn needs_catalog(&self) -> bool {
        match self {
            Commands::Breakdown(args) => args.needs_catalog(),
            Commands::Diff(args) => args.needs_catalog(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    if cli.metrics_out.is_some() {
        observability::init_metrics().wrap_err("Failed to install metrics recorder")?;
    }

    let result = run(cli.command, &config).await;

    if let Err(report) = &result {
        if let Some(err) = report.downcast_ref::<PricingError>() {
            error!(kind = %err.kind(), error = %err, "Pricing API request failed");
            if let Some(hint) = err.remediation() {
                eprintln!("\n{hint}");
            }
        }
    }

    if let Some(path) = &cli.metrics_out {
        io::write_metrics(path)?;
    }

    result
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    if command.needs_catalog() {
        config.pricing.require_api_key()?;
    }
    let estimator = CostEstimator::from_config(&config.pricing)?;

    match command {
        Commands::Breakdown(args) => {
            commands::breakdown(&args, &estimator).await?;
        }
        Commands::Diff(args) => {
            commands::diff(&args, &estimator).await?;
        }
    }

    Ok(())
}
