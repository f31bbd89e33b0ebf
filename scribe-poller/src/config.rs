//! Poller configuration
//!
//! Defines the cadence, backoff and optional ceilings used while watching
//! a job until it reaches a terminal status.

use std::time::Duration;

/// Delay between a read resolving and the next read being issued
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Upper bound for the delay after consecutive failed reads
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Poller configuration
///
/// Ceilings are disabled by default: a job that never leaves
/// `PENDING`/`PROCESSING` is polled until it is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between a read resolving and the next read
    pub poll_interval: Duration,

    /// Cap for the exponential backoff applied after failed reads
    pub max_backoff: Duration,

    /// Give up after this many reads without a terminal status
    pub max_attempts: Option<u32>,

    /// Give up once this much time has passed since polling started
    pub max_duration: Option<Duration>,
}

impl PollerConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_backoff: DEFAULT_MAX_BACKOFF,
            max_attempts: None,
            max_duration: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - SCRIBE_POLL_INTERVAL_MS (default: 2000)
    /// - SCRIBE_MAX_BACKOFF_MS (default: 30000)
    /// - SCRIBE_MAX_POLL_ATTEMPTS (default: unlimited)
    /// - SCRIBE_MAX_POLL_SECONDS (default: unlimited)
    pub fn from_env() -> anyhow::Result<Self> {
        let poll_interval = std::env::var("SCRIBE_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let max_backoff = std::env::var("SCRIBE_MAX_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_MAX_BACKOFF);

        let max_attempts = std::env::var("SCRIBE_MAX_POLL_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok());

        let max_duration = std::env::var("SCRIBE_MAX_POLL_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let config = Self {
            poll_interval,
            max_backoff,
            max_attempts,
            max_duration,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the delay between reads
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the backoff cap
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Limits the number of reads
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Limits how long a job is watched
    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }

    /// Delay before the next read after `failures` consecutive failed reads
    ///
    /// Doubles per failure starting from `poll_interval`, capped at `max_backoff`.
    pub fn backoff(&self, failures: u32) -> Duration {
        if failures == 0 {
            return self.poll_interval;
        }
        let factor = 2u32.saturating_pow(failures.min(16));
        self.poll_interval
            .saturating_mul(factor)
            .min(self.max_backoff.max(self.poll_interval))
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_backoff < self.poll_interval {
            anyhow::bail!("max_backoff must not be shorter than poll_interval");
        }

        if self.max_attempts == Some(0) {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if self.max_duration.is_some_and(|d| d.is_zero()) {
            anyhow::bail!("max_duration must be greater than 0");
        }

        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new()
    }
}
