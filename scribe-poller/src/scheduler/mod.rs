//! Scheduler layer
//!
//! This layer owns the polling loop that watches a job until it reaches a
//! terminal status, and the adapter that binds one loop to one job for a
//! consumer juggling several jobs at once.

pub mod events;
pub mod poller;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use events::{JobEvent, PollerCallbacks};
pub use poller::{JobPoller, JobPollerBuilder, PollerSnapshot, PollerState};
pub use watcher::JobWatcher;
