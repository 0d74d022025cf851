//! Politeness gate enforcing the fixed inter-request delay
//!
//! The gate is deliberately independent of fetch logic: the crawl loop waits
//! on it before every fetch, so the pacing policy can change without touching
//! extraction or fetching.

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum delay between successive requests
#[derive(Debug)]
pub struct RateGate {
    delay: Duration,
    last_request: Option<Instant>,
}

impl RateGate {
    /// Creates a gate with the given inter-request delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_request: None,
        }
    }

    /// Waits until the delay since the previous request has elapsed.
    ///
    /// The first call passes immediately. Each call marks the start of a
    /// new request, so callers must invoke this exactly once per fetch.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let ready_at = last + self.delay;
            let now = Instant::now();
            if ready_at > now {
                tokio::time::sleep(ready_at - now).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}
