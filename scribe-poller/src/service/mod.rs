//! Service layer
//!
//! Collaborators the poller consults but does not own: the shared job
//! cache and the "is the consumer active" predicate.
//!
//! Both are trait-based so they can be injected and replaced in tests.

mod activity;
mod job_cache;

// Re-export traits
pub use activity::ActivityProbe;
pub use job_cache::JobCache;

// Re-export implementations
pub use activity::{ActivityFlag, AlwaysActive};
pub use job_cache::{InMemoryJobCache, JOB_STATUS_SCOPE, JobCacheKey};
