//! Aggregate statistics over the loaded table
//!
//! These are the structs handed across the query boundary; the external
//! transport layer serializes them however it likes.

use crate::record::CatalogRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Collection-wide overview statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsOverview {
    /// Total number of records in the table
    pub total_books: u64,

    /// Mean price, rounded to 2 decimals
    pub average_price: f64,

    /// Lowest price in the table
    pub min_price: f64,

    /// Highest price in the table
    pub max_price: f64,

    /// Count of records per rating value
    pub rating_distribution: BTreeMap<u8, u64>,

    /// Number of distinct categories
    pub categories_count: u64,
}

impl StatsOverview {
    /// The zeroed overview an empty table reports
    pub fn empty() -> Self {
        Self {
            total_books: 0,
            average_price: 0.0,
            min_price: 0.0,
            max_price: 0.0,
            rating_distribution: BTreeMap::new(),
            categories_count: 0,
        }
    }
}

/// Per-category statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub total_books: u64,

    /// Mean price within the category, rounded to 2 decimals
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Rounds to 2 decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the collection overview
pub(crate) fn compute_overview(records: &[CatalogRecord]) -> StatsOverview {
    if records.is_empty() {
        return StatsOverview::empty();
    }

    let mut sum = 0.0;
    let mut min_price = f64::INFINITY;
    let mut max_price = f64::NEG_INFINITY;
    let mut rating_distribution = BTreeMap::new();
    let mut categories = BTreeSet::new();

    for record in records {
        sum += record.price;
        min_price = min_price.min(record.price);
        max_price = max_price.max(record.price);
        *rating_distribution.entry(record.rating).or_insert(0) += 1;
        categories.insert(record.category.as_str());
    }

    StatsOverview {
        total_books: records.len() as u64,
        average_price: round2(sum / records.len() as f64),
        min_price,
        max_price,
        rating_distribution,
        categories_count: categories.len() as u64,
    }
}

/// Computes per-category statistics, sorted by count descending with ties
/// broken by category name ascending
pub(crate) fn compute_category_stats(records: &[CatalogRecord]) -> Vec<CategoryStats> {
    // category -> (count, price sum, min, max)
    let mut groups: HashMap<&str, (u64, f64, f64, f64)> = HashMap::new();

    for record in records {
        let entry = groups
            .entry(record.category.as_str())
            .or_insert((0, 0.0, f64::INFINITY, f64::NEG_INFINITY));
        entry.0 += 1;
        entry.1 += record.price;
        entry.2 = entry.2.min(record.price);
        entry.3 = entry.3.max(record.price);
    }

    let mut stats: Vec<CategoryStats> = groups
        .into_iter()
        .map(|(category, (count, sum, min, max))| CategoryStats {
            category: category.to_string(),
            total_books: count,
            average_price: round2(sum / count as f64),
            min_price: min,
            max_price: max,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total_books
            .cmp(&a.total_books)
            .then_with(|| a.category.cmp(&b.category))
    });

    stats
}

/// Prints the overview to stdout in a formatted manner
pub fn print_overview(stats: &StatsOverview) {
    println!("=== Catalog Overview ===\n");
    println!("Total books: {}", stats.total_books);
    println!("Average price: {:.2}", stats.average_price);
    println!("Price range: {:.2} - {:.2}", stats.min_price, stats.max_price);
    println!("Distinct categories: {}", stats.categories_count);

    if !stats.rating_distribution.is_empty() {
        println!("\nRating distribution:");
        for (rating, count) in &stats.rating_distribution {
            println!("  {} stars: {}", rating, count);
        }
    }
}

/// Prints the per-category table to stdout
pub fn print_category_stats(stats: &[CategoryStats]) {
    println!("\n=== Categories ===\n");
    for entry in stats {
        println!(
            "  {}: {} books, avg {:.2} ({:.2} - {:.2})",
            entry.category,
            entry.total_books,
            entry.average_price,
            entry.min_price,
            entry.max_price
        );
    }
}
