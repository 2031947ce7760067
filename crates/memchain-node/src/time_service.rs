//! Clock backed by a remote precision time service.
//!
//! Ledger calls are synchronous, so the remote reading is held as an offset
//! from the local wall clock. A background task refreshes the offset; any
//! failure resets it to zero, which makes `now_micros` fall back to local time.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use memchain_primitives::{Clock, SystemClock};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Default interval between offset refreshes
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Why a time-service reading was discarded
#[derive(Debug, Error)]
pub enum TimeServiceError {
    /// Connect error, timeout or unreadable body
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-success HTTP status
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Deserialize)]
struct EpochReading {
    epoch_microseconds: i64,
}

/// Local clock corrected by the last good time-service reading
#[derive(Debug)]
pub struct TimeServiceClock {
    url: String,
    client: reqwest::Client,
    offset_micros: AtomicI64,
}

impl TimeServiceClock {
    /// Create a clock for the service at `base_url` (no trailing path)
    pub fn new(base_url: impl Into<String>) -> Result<Self, TimeServiceError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            url: format!("{}/epoch_micros", base_url.into().trim_end_matches('/')),
            client,
            offset_micros: AtomicI64::new(0),
        })
    }

    /// Current correction applied to local time
    pub fn offset_micros(&self) -> i64 {
        self.offset_micros.load(Ordering::Relaxed)
    }

    /// Query the service once and update the offset.
    ///
    /// Returns `false` when the reading failed and local time is used.
    pub async fn refresh(&self) -> bool {
        match self.fetch().await {
            Ok(remote) => {
                let offset = remote - SystemClock.now_micros();
                self.offset_micros.store(offset, Ordering::Relaxed);
                tracing::debug!("Time service offset {} us", offset);
                true
            }
            Err(e) => {
                tracing::warn!("Time service unavailable, using local clock: {}", e);
                self.offset_micros.store(0, Ordering::Relaxed);
                false
            }
        }
    }

    async fn fetch(&self) -> Result<i64, TimeServiceError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(TimeServiceError::Status(response.status()));
        }
        let reading: EpochReading = response.json().await?;
        Ok(reading.epoch_microseconds)
    }

    /// Refresh every `every` until `shutdown` flips to true
    pub async fn run_refresh(self: Arc<Self>, every: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

impl Clock for TimeServiceClock {
    fn now_micros(&self) -> i64 {
        SystemClock.now_micros() + self.offset_micros()
    }
}
