use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Bookstall
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Crawl target configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the catalog site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path segment under the root where catalog item pages live
    #[serde(rename = "catalogue-path", default = "default_catalogue_path")]
    pub catalogue_path: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Fixed delay between successive requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Maximum time to wait for one response (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Number of automatic re-attempts after a failed page fetch
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the dataset snapshot is written to
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Filename of the CSV dataset within the data directory
    #[serde(rename = "csv-filename")]
    pub csv_filename: String,
}

impl Config {
    /// Full path of the persisted dataset file
    pub fn dataset_path(&self) -> PathBuf {
        PathBuf::from(&self.output.data_dir).join(&self.output.csv_filename)
    }
}

fn default_catalogue_path() -> String {
    "catalogue".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}
