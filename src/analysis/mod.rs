//! Aggregation of per-document word counts.
//!
//! `aggregator` folds partials into totals; `runner` drives the sequential
//! fetch-and-count loop for both run modes.

pub mod aggregator;
pub mod runner;

pub use aggregator::*;
pub use runner::{run_historical, run_snapshot, RunOptions};
