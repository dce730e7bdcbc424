//! Periodic word list refresh.
//!
//! The refresher never touches the bank. It fetches on a fixed interval and
//! forwards the raw text, and the owner of the bank applies it between
//! events. A failed fetch is logged and skipped; the current vocabulary
//! stays in use.
//!
//! ```ignore
//! let (tx, mut rx) = mpsc::channel(1);
//! tokio::spawn(WordRefresher::new(source, RefreshConfig::default()).run(tx));
//! while let Some(raw) = rx.recv().await {
//!     bank.refresh(&raw)?;
//! }
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::WordSource;

/// How often the word list is fetched again.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// How often to poll the word source.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between fetches. The first fetch happens immediately.
    pub interval: Duration,
    /// Fetch once at startup before waiting a full interval.
    pub fetch_on_start: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            fetch_on_start: true,
        }
    }
}

impl RefreshConfig {
    /// Shortest interval accepted. Anything lower would hammer the source.
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Raises `interval` to [`Self::MIN_INTERVAL`] if it is shorter.
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                "refresh interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

/// Polls a [`WordSource`] and forwards what it returns.
pub struct WordRefresher<S> {
    source: S,
    config: RefreshConfig,
}

impl<S: WordSource> WordRefresher<S> {
    pub fn new(source: S, config: RefreshConfig) -> Self {
        Self {
            source,
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Runs until the receiving side of `tx` is dropped.
    ///
    /// Fetch errors are logged at `warn` and the loop carries on; the next
    /// attempt is a full interval later.
    pub async fn run(self, tx: mpsc::Sender<String>) {
        let mut ticker = time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.config.fetch_on_start {
            // The first tick of an interval completes immediately.
            ticker.tick().await;
        }

        info!(
            interval_secs = self.config.interval.as_secs(),
            "word refresher started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            match self.source.fetch().await {
                Ok(raw) => {
                    debug!(bytes = raw.len(), "fetched word list");
                    if tx.send(raw).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "word list fetch failed, keeping current words");
                }
            }
        }

        debug!("word refresher stopped");
    }
}
