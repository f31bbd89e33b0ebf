//! Repository layer
//!
//! Repositories abstract the single read the poller performs against the
//! content-generation API. They contain no polling or retry logic.
//!
//! The trait seam lets the poller run against scripted fakes in tests.

mod jobs;

// Re-export traits
pub use jobs::JobRepository;

// Re-export implementations
pub use jobs::HttpJobRepository;
