//! Scribe Poller
//!
//! Client-side watcher for the content-generation backend's long-running
//! jobs (title, outline and blog generation).
//!
//! Architecture:
//! - Configuration: cadence, backoff and optional ceilings
//! - Repository: a single read of a job's state (HTTP or fake)
//! - Services: the shared job cache and the consumer-activity predicate
//! - Scheduler: the polling state machine and the per-job watcher
//!
//! A caller starts a job through the API, hands the returned id to a
//! [`JobPoller`] (or mounts a [`JobWatcher`]), and gets exactly one terminal
//! callback once the job completes, fails or a configured ceiling is hit.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scribe_client::ScribeClient;
//! use scribe_poller::{HttpJobRepository, JobPoller, PollerCallbacks, PollerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = Arc::new(ScribeClient::new("http://localhost:3000/api"));
//! let (callbacks, mut events) = PollerCallbacks::channel();
//!
//! let poller = JobPoller::builder(Arc::new(HttpJobRepository::new(client)))
//!     .config(PollerConfig::from_env()?)
//!     .callbacks(callbacks)
//!     .build();
//!
//! poller.start("job-1");
//! if let Some(event) = events.recv().await {
//!     println!("{}", event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod repository;
pub mod scheduler;
pub mod service;

pub use config::PollerConfig;
pub use repository::{HttpJobRepository, JobRepository};
pub use scheduler::{
    JobEvent, JobPoller, JobPollerBuilder, JobWatcher, PollerCallbacks, PollerSnapshot,
    PollerState,
};
pub use service::{ActivityFlag, ActivityProbe, AlwaysActive, InMemoryJobCache, JobCache, JobCacheKey};
