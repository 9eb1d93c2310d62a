//! End-of-run summary

use crate::crawler::Area;
use crate::import::{CollectionAction, NeighborhoodReport};

/// Counts accumulated over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dry_run: bool,

    /// Areas visited, in order
    pub areas_visited: Vec<Area>,
    pub areas_processed: usize,
    pub areas_skipped: usize,

    pub neighborhoods_processed: usize,
    pub neighborhoods_skipped: usize,
    /// Neighborhoods cut by `--max-neighborhoods`
    pub neighborhoods_limited: usize,

    pub collections_created: usize,
    pub images_created: usize,
    pub images_would_create: usize,
    pub images_duplicate: usize,
    pub images_malformed: usize,
    pub images_failed: usize,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Adds one imported neighborhood's report
    pub fn record_neighborhood(&mut self, report: &NeighborhoodReport) {
        self.neighborhoods_processed += 1;
        if matches!(
            report.collection,
            CollectionAction::Created | CollectionAction::WouldCreate
        ) {
            self.collections_created += 1;
        }
        self.images_created += report.created;
        self.images_would_create += report.would_create;
        self.images_duplicate += report.duplicates;
        self.images_failed += report.failed;
    }

    /// New images written, or that would be written in a dry run
    pub fn images_imported(&self) -> usize {
        if self.dry_run {
            self.images_would_create
        } else {
            self.images_created
        }
    }

    /// Images passed over for any reason
    pub fn images_skipped(&self) -> usize {
        self.images_duplicate + self.images_malformed + self.images_failed
    }
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    let verb = if summary.dry_run {
        "Would import"
    } else {
        "Imported"
    };
    let areas = summary
        .areas_visited
        .iter()
        .map(|area| area.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    println!("\n=== Import Summary{} ===\n", if summary.dry_run { " (dry run)" } else { "" });

    println!("Areas ({}):", areas);
    println!("  Processed: {}", summary.areas_processed);
    println!("  Skipped: {}", summary.areas_skipped);
    println!();

    println!("Neighborhoods:");
    println!("  Processed: {}", summary.neighborhoods_processed);
    println!("  Skipped (errors): {}", summary.neighborhoods_skipped);
    println!("  Skipped (limit): {}", summary.neighborhoods_limited);
    println!(
        "  {} collections: {}",
        if summary.dry_run { "New" } else { "Created" },
        summary.collections_created
    );
    println!();

    println!("Images:");
    println!("  {}: {}", verb, summary.images_imported());
    println!("  Skipped: {}", summary.images_skipped());
    println!("    Duplicates: {}", summary.images_duplicate);
    println!("    Malformed: {}", summary.images_malformed);
    println!("    Failed: {}", summary.images_failed);
}
