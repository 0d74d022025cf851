//! Bookstall main entry point
//!
//! Command-line interface for the catalog harvester.

use bookstall::config::load_config;
use bookstall::crawler::crawl;
use bookstall::query::{print_category_stats, print_overview, QueryEngine};
use bookstall::storage;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bookstall: a catalog harvester and query engine
///
/// Bookstall crawls an HTML book catalog category by category, writes the
/// extracted records as a CSV dataset snapshot, and can print aggregate
/// statistics over the persisted dataset.
#[derive(Parser, Debug)]
#[command(name = "bookstall")]
#[command(version = "1.0.0")]
#[command(about = "A catalog harvester and query engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the persisted dataset and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config);
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookstall=info,warn"),
            1 => EnvFilter::new("bookstall=debug,info"),
            2 => EnvFilter::new("bookstall=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &bookstall::Config) {
    println!("=== Bookstall Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Catalogue path: {}", config.site.catalogue_path);

    println!("\nCrawler:");
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nOutput:");
    println!("  Dataset: {}", config.dataset_path().display());

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: prints statistics from the persisted dataset
fn handle_stats(config: &bookstall::Config) {
    let path = config.dataset_path();
    println!("Dataset: {}\n", path.display());

    let engine = QueryEngine::new(storage::load_dataset(&path));

    print_overview(&engine.overview());
    print_category_stats(&engine.category_stats());
}

/// Handles the default crawl operation
async fn handle_crawl(config: &bookstall::Config) -> Result<(), Box<dyn std::error::Error>> {
    let report = match crawl(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    storage::write_dataset(&config.dataset_path(), &report.records)?;

    println!(
        "Crawl finished: {} records from {} categories ({} items skipped, {} pages failed)",
        report.records.len(),
        report.categories,
        report.skipped_items,
        report.failed_pages
    );
    println!("Dataset written to {}", config.dataset_path().display());

    Ok(())
}
