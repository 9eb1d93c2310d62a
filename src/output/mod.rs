//! Output module for run summaries and catalog reports
//!
//! This module handles:
//! - Tallying what a run did and printing the end-of-run summary
//! - Loading and printing catalog statistics for `--stats`

pub mod stats;
mod summary;

pub use stats::{load_statistics, print_statistics, CatalogStatistics};
pub use summary::{print_summary, RunSummary};
