//! RES Importer main entry point
//!
//! This is the command-line interface for the Richmond Esthetic Survey importer.

use clap::Parser;
use res_importer::config::{load_config_with_hash, Config};
use res_importer::crawler::{run_import, RunOptions};
use res_importer::output::{load_statistics, print_statistics, print_summary};
use res_importer::storage::SqliteStorage;
use res_importer::AreaSelector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// RES Importer: Richmond Esthetic Survey scraper
///
/// Scrapes the Library of Virginia's 1965 Richmond Esthetic Survey, one
/// area at a time, and imports every image into the catalog database.
/// Re-running is safe: images already catalogued are skipped.
#[derive(Parser, Debug)]
#[command(name = "res-importer")]
#[command(version)]
#[command(about = "Imports the 1965 Richmond Esthetic Survey into the catalog", long_about = None)]
struct Cli {
    /// Survey area to import: A, B, C, D or ALL
    #[arg(long, value_name = "AREA", required_unless_present = "stats")]
    area: Option<AreaSelector>,

    /// Process at most N neighborhoods per area
    #[arg(long, value_name = "N", value_parser = parse_limit)]
    max_neighborhoods: Option<usize>,

    /// Import at most N images per neighborhood
    #[arg(long, value_name = "N", value_parser = parse_limit)]
    max_images: Option<usize>,

    /// Scrape and look everything up without writing to the catalog
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Catalog database path (overrides the configuration)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Show statistics from the catalog database and exit
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(database) = &cli.database {
        config.database.path = database.display().to_string();
    }

    if cli.stats {
        return handle_stats(&config);
    }

    let selector = cli.area.ok_or("--area is required")?;
    let options = RunOptions {
        dry_run: cli.dry_run,
        max_neighborhoods: cli.max_neighborhoods,
        max_images: cli.max_images,
    };

    handle_import(config, selector, options).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("res_importer=info,warn"),
            1 => EnvFilter::new("res_importer=debug,info"),
            2 => EnvFilter::new("res_importer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Parses a `--max-*` value, which must be at least 1
fn parse_limit(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Handles the --stats mode: shows statistics from the catalog
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.database.path);

    let storage = SqliteStorage::new(Path::new(&config.database.path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main import operation
async fn handle_import(
    config: Config,
    selector: AreaSelector,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Catalog database: {}", config.database.path);
    if options.dry_run {
        tracing::info!("Dry run: nothing will be written");
    }

    match run_import(config, selector, options).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Import failed: {}", e);
            Err(e.into())
        }
    }
}
