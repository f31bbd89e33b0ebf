//! Configuration module
//!
//! Handles CLI configuration: API location, the opaque auth token and the
//! polling settings used while waiting for jobs.

use anyhow::{Context, Result};
use clap::Args;
use scribe_client::ScribeClient;
use scribe_poller::PollerConfig;
use std::sync::Arc;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the content-generation API
    pub api_url: String,

    /// Bearer token forwarded as-is
    pub api_token: Option<String>,

    /// Polling defaults, read from the SCRIBE_* environment variables
    pub poller: PollerConfig,
}

impl Config {
    /// Builds and validates the configuration
    pub fn new(api_url: String, api_token: Option<String>) -> Result<Self> {
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        let poller = PollerConfig::from_env().context("Invalid polling configuration")?;

        Ok(Self {
            api_url,
            api_token,
            poller,
        })
    }

    /// Creates an API client for this configuration
    pub fn client(&self) -> Arc<ScribeClient> {
        let client = ScribeClient::new(&self.api_url);
        let client = match &self.api_token {
            Some(token) => client.with_token(token),
            None => client,
        };
        Arc::new(client)
    }
}

/// Polling overrides shared by every command that waits for a job
#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
    /// Delay between status reads, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Give up after this many status reads
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl PollArgs {
    /// Applies the overrides on top of `base`
    pub fn apply(&self, base: &PollerConfig) -> Result<PollerConfig> {
        let mut config = base.clone();

        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
            config.max_backoff = config.max_backoff.max(config.poll_interval);
        }
        if let Some(attempts) = self.max_attempts {
            config = config.with_max_attempts(attempts);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_max_duration(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        assert!(Config::new("localhost:3000".to_string(), None).is_err());
    }

    #[test]
    fn test_poll_args_override_defaults() {
        let args = PollArgs {
            poll_interval_ms: Some(500),
            max_attempts: Some(10),
            timeout_secs: Some(60),
        };

        let config = args.apply(&PollerConfig::default()).unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_attempts, Some(10));
        assert_eq!(config.max_duration, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_no_overrides_keeps_base() {
        let base = PollerConfig::default();
        assert_eq!(PollArgs::default().apply(&base).unwrap(), base);
    }

    #[test]
    fn test_long_interval_raises_backoff_cap() {
        let args = PollArgs {
            poll_interval_ms: Some(60_000),
            ..PollArgs::default()
        };
        let config = args.apply(&PollerConfig::default()).unwrap();
        assert_eq!(config.max_backoff, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let args = PollArgs {
            max_attempts: Some(0),
            ..PollArgs::default()
        };
        assert!(args.apply(&PollerConfig::default()).is_err());
    }
}
