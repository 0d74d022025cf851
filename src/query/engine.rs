//! The in-memory query engine
//!
//! Holds the current table as a swappable snapshot: an immutable
//! `Arc<Vec<CatalogRecord>>` behind an `RwLock`. Every query clones the Arc
//! under a momentary read lock and runs against that snapshot, so a
//! concurrent [`reload`](QueryEngine::reload) can never produce a torn
//! read — an in-flight query observes either the fully-old or fully-new
//! table. Readers never wait on a reload in progress and a reload never
//! waits for readers to drain.

use crate::query::stats::{compute_category_stats, compute_overview, CategoryStats, StatsOverview};
use crate::record::CatalogRecord;
use crate::{QueryError, QueryResult};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// Upper bound on the page size accepted by [`QueryEngine::paginate`]
pub const MAX_PAGE_SIZE: usize = 100;

/// Upper bound on the limit accepted by [`QueryEngine::top_rated`]
pub const MAX_TOP_RATED: usize = 50;

/// Read-mostly query engine over the loaded dataset
pub struct QueryEngine {
    table: RwLock<Arc<Vec<CatalogRecord>>>,
}

impl QueryEngine {
    /// Creates an engine serving the given table
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self {
            table: RwLock::new(Arc::new(records)),
        }
    }

    /// The current snapshot; queries run entirely against this
    fn snapshot(&self) -> Arc<Vec<CatalogRecord>> {
        let guard = self.table.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Atomically replaces the active table
    ///
    /// Overlapping reloads are not serialized against each other; the last
    /// swap wins and every reader sees some complete snapshot.
    pub fn reload(&self, records: Vec<CatalogRecord>) {
        let fresh = Arc::new(records);
        let mut guard = self.table.write().unwrap_or_else(|e| e.into_inner());
        *guard = fresh;
    }

    /// Number of records in the current table
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Returns one page of the table in load order
    ///
    /// `page` is 1-based; `size` must be in `[1, 100]`. An out-of-range
    /// slice yields an empty or partial result, never an error.
    pub fn paginate(&self, page: usize, size: usize) -> QueryResult<Vec<CatalogRecord>> {
        if page < 1 {
            return Err(QueryError::Validation(format!(
                "page must be >= 1, got {}",
                page
            )));
        }
        if size < 1 || size > MAX_PAGE_SIZE {
            return Err(QueryError::Validation(format!(
                "size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }

        let table = self.snapshot();
        let start = (page - 1).saturating_mul(size);
        let end = start.saturating_add(size).min(table.len());

        if start >= table.len() {
            return Ok(Vec::new());
        }
        Ok(table[start..end].to_vec())
    }

    /// Filters by title and/or category substring, case-insensitively
    ///
    /// With neither filter given this returns an empty list — an explicit
    /// guard against an accidental full dump. Both filters given means AND.
    pub fn search(&self, title: Option<&str>, category: Option<&str>) -> Vec<CatalogRecord> {
        if title.is_none() && category.is_none() {
            return Vec::new();
        }

        let title = title.map(str::to_lowercase);
        let category = category.map(str::to_lowercase);

        self.snapshot()
            .iter()
            .filter(|record| {
                let title_ok = title
                    .as_deref()
                    .map_or(true, |t| record.title.to_lowercase().contains(t));
                let category_ok = category
                    .as_deref()
                    .map_or(true, |c| record.category.to_lowercase().contains(c));
                title_ok && category_ok
            })
            .cloned()
            .collect()
    }

    /// Collection-wide overview; zeroed for an empty table
    pub fn overview(&self) -> StatsOverview {
        compute_overview(&self.snapshot())
    }

    /// Per-category statistics, count descending then category ascending
    pub fn category_stats(&self) -> Vec<CategoryStats> {
        compute_category_stats(&self.snapshot())
    }

    /// The highest-rated records
    ///
    /// Ordered by rating descending, then price descending, then title
    /// ascending. `limit` must be in `[1, 50]`.
    pub fn top_rated(&self, limit: usize) -> QueryResult<Vec<CatalogRecord>> {
        if limit < 1 || limit > MAX_TOP_RATED {
            return Err(QueryError::Validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_TOP_RATED, limit
            )));
        }

        let mut records = self.snapshot().as_ref().clone();
        records.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| b.price.total_cmp(&a.price))
                .then_with(|| a.title.cmp(&b.title))
        });
        records.truncate(limit);
        Ok(records)
    }

    /// Records with `min <= price <= max`, price ascending then title
    /// ascending
    pub fn price_range(&self, min: f64, max: f64) -> QueryResult<Vec<CatalogRecord>> {
        if min < 0.0 || max < 0.0 {
            return Err(QueryError::Validation(format!(
                "price bounds must be non-negative, got min={} max={}",
                min, max
            )));
        }
        if min > max {
            return Err(QueryError::Validation(format!(
                "min price {} is greater than max price {}",
                min, max
            )));
        }

        let mut records: Vec<CatalogRecord> = self
            .snapshot()
            .iter()
            .filter(|record| record.price >= min && record.price <= max)
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            a.price
                .total_cmp(&b.price)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(records)
    }

    /// Looks up one record by id
    ///
    /// Distinct from an empty result set: an absent id is `NotFound`.
    pub fn get_by_id(&self, id: u32) -> QueryResult<CatalogRecord> {
        self.snapshot()
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(QueryError::NotFound { id })
    }

    /// Distinct category values, sorted ascending
    pub fn categories(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|record| record.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, title: &str, price: f64, rating: u8, category: &str) -> CatalogRecord {
        CatalogRecord {
            id,
            title: title.to_string(),
            price,
            rating,
            availability: 1,
            category: category.to_string(),
            image_url: String::new(),
            product_url: String::new(),
        }
    }

    fn sample_engine() -> QueryEngine {
        QueryEngine::new(vec![
            record(1, "A Light in the Attic", 51.77, 3, "Poetry"),
            record(2, "Tipping the Velvet", 53.74, 1, "Historical Fiction"),
            record(3, "Soumission", 50.10, 1, "Fiction"),
            record(4, "Sharp Objects", 47.82, 4, "Mystery"),
            record(5, "Sapiens", 54.23, 5, "History"),
            record(6, "The Requiem Red", 22.65, 1, "Young Adult"),
            record(7, "Olio", 23.88, 1, "Poetry"),
        ])
    }

    #[test]
    fn test_paginate_slices_in_load_order() {
        let engine = sample_engine();

        let page1 = engine.paginate(1, 3).unwrap();
        assert_eq!(page1.len(), 3);
        assert_eq!(page1[0].id, 1);
        assert_eq!(page1[2].id, 3);

        let page2 = engine.paginate(2, 3).unwrap();
        assert_eq!(page2[0].id, 4);
    }

    #[test]
    fn test_paginate_partial_and_out_of_range() {
        let engine = sample_engine();

        // Last page is partial
        let page = engine.paginate(3, 3).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 7);

        // Past the end is empty, not an error
        assert!(engine.paginate(4, 3).unwrap().is_empty());
        assert!(engine.paginate(100, 100).unwrap().is_empty());
    }

    #[test]
    fn test_paginate_rejects_bad_parameters() {
        let engine = sample_engine();
        assert!(matches!(
            engine.paginate(0, 10),
            Err(QueryError::Validation(_))
        ));
        assert!(matches!(
            engine.paginate(1, 0),
            Err(QueryError::Validation(_))
        ));
        assert!(matches!(
            engine.paginate(1, 101),
            Err(QueryError::Validation(_))
        ));
    }

    #[test]
    fn test_search_without_filters_returns_empty() {
        let engine = sample_engine();
        assert!(engine.search(None, None).is_empty());
    }

    #[test]
    fn test_search_title_case_insensitive() {
        let engine = sample_engine();
        let results = engine.search(Some("light"), None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "A Light in the Attic");
    }

    #[test]
    fn test_search_category_substring() {
        let engine = sample_engine();
        let results = engine.search(None, Some("fiction"));
        // "Historical Fiction" and "Fiction"
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_search_both_filters_is_and() {
        let engine = sample_engine();
        let results = engine.search(Some("o"), Some("poetry"));
        // Only Poetry titles containing "o"
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Olio");
    }

    #[test]
    fn test_search_no_match_is_empty_not_error() {
        let engine = sample_engine();
        assert!(engine.search(Some("zzzzzz"), None).is_empty());
    }

    #[test]
    fn test_top_rated_ordering() {
        let engine = sample_engine();
        let top = engine.top_rated(3).unwrap();

        assert_eq!(top.len(), 3);
        for pair in top.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let ordered = a.rating > b.rating
                || (a.rating == b.rating && a.price > b.price)
                || (a.rating == b.rating && a.price == b.price && a.title <= b.title);
            assert!(ordered, "{} should sort before {}", a.title, b.title);
        }
        assert_eq!(top[0].title, "Sapiens");
    }

    #[test]
    fn test_top_rated_title_tiebreak() {
        let engine = QueryEngine::new(vec![
            record(1, "Beta", 10.0, 5, "X"),
            record(2, "Alpha", 10.0, 5, "X"),
        ]);

        let top = engine.top_rated(2).unwrap();
        assert_eq!(top[0].title, "Alpha");
        assert_eq!(top[1].title, "Beta");
    }

    #[test]
    fn test_top_rated_limit_bounds() {
        let engine = sample_engine();
        assert!(engine.top_rated(0).is_err());
        assert!(engine.top_rated(51).is_err());
        assert_eq!(engine.top_rated(50).unwrap().len(), 7);
    }

    #[test]
    fn test_price_range_inverted_bounds_fail() {
        let engine = sample_engine();
        assert!(matches!(
            engine.price_range(10.0, 5.0),
            Err(QueryError::Validation(_))
        ));
    }

    #[test]
    fn test_price_range_negative_bounds_fail() {
        let engine = sample_engine();
        assert!(engine.price_range(-1.0, 10.0).is_err());
    }

    #[test]
    fn test_price_range_inclusive_and_sorted() {
        let engine = sample_engine();
        let results = engine.price_range(0.0, 50.10).unwrap();

        assert!(results.iter().all(|r| r.price >= 0.0 && r.price <= 50.10));
        assert_eq!(results.last().map(|r| r.id), Some(3)); // boundary included
        for pair in results.windows(2) {
            assert!(
                pair[0].price < pair[1].price
                    || (pair[0].price == pair[1].price && pair[0].title <= pair[1].title)
            );
        }
    }

    #[test]
    fn test_get_by_id() {
        let engine = sample_engine();
        let record = engine.get_by_id(4).unwrap();
        assert_eq!(record.title, "Sharp Objects");
    }

    #[test]
    fn test_get_by_id_missing_is_not_found() {
        let engine = sample_engine();
        assert!(matches!(
            engine.get_by_id(999),
            Err(QueryError::NotFound { id: 999 })
        ));
    }

    #[test]
    fn test_categories_distinct_sorted() {
        let engine = sample_engine();
        let categories = engine.categories();

        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0], "Fiction");
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
    }

    #[test]
    fn test_empty_table_queries() {
        let engine = QueryEngine::default();

        assert!(engine.is_empty());
        assert_eq!(engine.overview(), StatsOverview::empty());
        assert!(engine.category_stats().is_empty());
        assert!(engine.paginate(1, 10).unwrap().is_empty());
        assert!(engine.top_rated(5).unwrap().is_empty());
        assert!(engine.categories().is_empty());
        assert!(engine.get_by_id(1).is_err());
    }

    #[test]
    fn test_reload_swaps_table() {
        let engine = sample_engine();
        assert_eq!(engine.len(), 7);

        engine.reload(vec![record(1, "Only", 9.99, 2, "Art")]);

        assert_eq!(engine.len(), 1);
        assert_eq!(engine.get_by_id(1).unwrap().title, "Only");
        assert!(engine.get_by_id(2).is_err());
    }

    #[test]
    fn test_concurrent_reads_see_complete_snapshots() {
        use std::sync::Arc;
        use std::thread;

        // Two tables of different sizes; any observed count must match one
        // of them exactly.
        let small: Vec<CatalogRecord> =
            (1..=10).map(|i| record(i, "S", 1.0, 1, "X")).collect();
        let large: Vec<CatalogRecord> =
            (1..=500).map(|i| record(i, "L", 2.0, 2, "Y")).collect();

        let engine = Arc::new(QueryEngine::new(small.clone()));

        let writer = {
            let engine = Arc::clone(&engine);
            let (small, large) = (small.clone(), large.clone());
            thread::spawn(move || {
                for _ in 0..200 {
                    engine.reload(large.clone());
                    engine.reload(small.clone());
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let overview = engine.overview();
                        let count = overview.total_books;
                        assert!(
                            count == 10 || count == 500,
                            "torn snapshot: {} records",
                            count
                        );
                        // Distribution must be internally consistent too
                        let sum: u64 = overview.rating_distribution.values().sum();
                        assert_eq!(sum, count);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
