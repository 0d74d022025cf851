//! HTTP fetcher implementation
//!
//! This module performs the single-page fetches the crawler is built on:
//! - Building an HTTP client with the configured user agent and timeouts
//! - GET requests returning the page body
//! - Retry handling for transient failures (timeouts, 5xx)
//! - Error classification into [`FetchError`]

use crate::config::CrawlerConfig;
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Delay between automatic re-attempts of a failed fetch
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Builds an HTTP client with the configured user agent and timeouts
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.request_timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page and returns its body
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 4xx | Immediate failure |
/// | HTTP 5xx | Retry up to `max_retries` times |
/// | Timeout | Retry up to `max_retries` times |
/// | Connection error | Immediate failure |
///
/// Exactly one request is in flight at a time; pacing between calls is the
/// caller's concern (see [`RateGate`](crate::crawler::RateGate)).
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `max_retries` - Number of automatic re-attempts for transient failures
///
/// # Returns
///
/// * `Ok(String)` - The response body
/// * `Err(FetchError)` - The classified failure after retries are exhausted
pub async fn fetch_page(client: &Client, url: &Url, max_retries: u32) -> Result<String, FetchError> {
    let mut attempt = 0;

    loop {
        match try_fetch(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                if attempt < max_retries && is_transient(&e) {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        max_retries
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
                return Err(e);
            }
        }
    }
}

/// Performs a single GET request with no retry
async fn try_fetch(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            if e.is_timeout() {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                });
            }
            return Err(FetchError::Http {
                url: url.to_string(),
                source: e,
            });
        }
    };

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: e,
            }
        }
    })
}

/// Transient failures are worth re-attempting; everything else fails fast
fn is_transient(error: &FetchError) -> bool {
    match error {
        FetchError::Timeout { .. } => true,
        FetchError::Status { status, .. } => {
            StatusCode::from_u16(*status).map_or(false, |s| s.is_server_error())
        }
        FetchError::Http { .. } => false,
    }
}
