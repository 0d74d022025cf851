//! Crawler module for catalog harvesting
//!
//! This module contains the crawl pipeline:
//! - HTTP fetching with retry handling
//! - Politeness gating between requests
//! - Category discovery and pagination
//! - Per-item record extraction
//! - Id assignment in crawl-visitation order

mod extractor;
mod fetcher;
mod gate;
mod walker;

pub use extractor::extract_book;
pub use fetcher::{build_http_client, fetch_page};
pub use gate::RateGate;
pub use walker::{Category, CategoryWalk, CategoryWalker};

use crate::config::Config;
use crate::query::QueryEngine;
use crate::record::{CatalogRecord, IdAssigner};
use crate::{storage, Result};

/// Outcome of one complete crawl run
#[derive(Debug)]
pub struct CrawlReport {
    /// All successfully extracted records, ids dense from 1 when nothing
    /// was skipped
    pub records: Vec<CatalogRecord>,

    /// Items skipped due to extraction failures
    pub skipped_items: usize,

    /// Pages whose fetch failed (each ends pagination of its category)
    pub failed_pages: usize,

    /// Number of categories discovered on the root page
    pub categories: usize,
}

/// Runs a complete crawl of the configured catalog
///
/// Visits categories in navigation order, pages in link order, and items
/// in page order; ids are assigned in exactly that sequence. Fetch and
/// extraction failures are absorbed per category / per item and counted in
/// the report; only a failure to reach the root page aborts the run.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Records and failure counts for the run
/// * `Err(CatalogError)` - The root page could not be fetched or parsed
pub async fn crawl(config: &Config) -> Result<CrawlReport> {
    tracing::info!("Starting crawl of {}", config.site.base_url);

    let mut walker = CategoryWalker::new(config)?;
    let categories = walker.discover_categories().await?;

    let mut ids = IdAssigner::new();
    let mut report = CrawlReport {
        records: Vec::new(),
        skipped_items: 0,
        failed_pages: 0,
        categories: categories.len(),
    };

    for category in &categories {
        let walk = walker.walk_category(category).await;

        for book in walk.books {
            report.records.push(ids.assign(book));
        }
        report.skipped_items += walk.skipped_items;
        report.failed_pages += walk.failed_pages;
    }

    tracing::info!(
        "Crawl complete: {} records from {} categories ({} items skipped, {} pages failed)",
        report.records.len(),
        report.categories,
        report.skipped_items,
        report.failed_pages
    );

    Ok(report)
}

/// Re-runs the full pipeline and atomically reloads the query engine
///
/// This is the single parameterless re-crawl trigger: crawl, persist the
/// dataset (full replace), load it back, and swap it into the engine.
///
/// # Returns
///
/// * `Ok(usize)` - The record count now served by the engine
/// * `Err(CatalogError)` - The crawl or the dataset write failed
pub async fn refresh(config: &Config, engine: &QueryEngine) -> Result<usize> {
    let report = crawl(config).await?;

    let path = config.dataset_path();
    storage::write_dataset(&path, &report.records)?;

    let table = storage::load_dataset(&path);
    let count = table.len();
    engine.reload(table);

    tracing::info!("Query engine reloaded with {} records", count);
    Ok(count)
}
