//! Bookstall: a catalog harvester and query engine
//!
//! This crate implements a sequential crawler that walks the category tree of
//! an HTML book catalog, extracts normalized records, persists them as a flat
//! CSV snapshot, and serves filtering, sorting, and aggregate statistics over
//! the loaded snapshot with atomic whole-table reload.

pub mod config;
pub mod crawler;
pub mod query;
pub mod record;
pub mod storage;

use thiserror::Error;

/// Main error type for Bookstall operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure fetching one page; non-fatal at category granularity
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Failure extracting one catalog item; non-fatal at item granularity
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Item missing {0}")]
    Missing(&'static str),

    #[error("Unparseable price text '{text}'")]
    InvalidPrice { text: String },

    #[error("Failed to resolve URL '{href}': {source}")]
    UrlResolve {
        href: String,
        source: url::ParseError,
    },
}

/// Failure writing or reading the persisted dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to persist dataset: {0}")]
    Persist(String),
}

/// Errors surfaced to callers of the query engine
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No record with id {id}")]
    NotFound { id: u32 },
}

/// Result type alias for Bookstall operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, refresh, CrawlReport};
pub use query::{CategoryStats, QueryEngine, StatsOverview};
pub use record::CatalogRecord;
