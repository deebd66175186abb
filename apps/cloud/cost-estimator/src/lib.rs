//! Cost Estimator
//!
//! Prices infrastructure projects against a cloud pricing catalog and
//! compares two snapshots of a project.
//!
//! ## Flow
//!
//! ```text
//! Project JSON
//!   ↓ (PriceResolver, worker pool)
//! Pricing catalog (GraphQL, batched + cached)
//!   ↓ (cost calculator)
//! Breakdown
//!   ↓ (diff aligner, optional)
//! BreakdownDiff JSON
//! ```

pub mod commands;
pub mod config;
pub mod estimator;
pub mod io;

pub use commands::{BreakdownArgs, DiffArgs};
pub use config::Config;
pub use estimator::CostEstimator;
