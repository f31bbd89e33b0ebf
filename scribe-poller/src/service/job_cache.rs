//! Job cache service
//!
//! Read-through cache of the last-known state of each watched job.
//! Entries are written after each successful read and evicted once the job
//! reaches a terminal status or is abandoned, so reusing an identifier
//! starts fresh. Pollers read the entry back before every read, so a record
//! stored by anyone else reaches them without another request.

use scribe_core::domain::job::{Job, JobId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Scope shared by every job-status cache key
pub const JOB_STATUS_SCOPE: &str = "job-status";

/// Compound cache key, `("job-status", job_id)`
///
/// The scope keeps job entries from colliding with anything else stored
/// under the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobCacheKey {
    scope: &'static str,
    job_id: JobId,
}

impl JobCacheKey {
    /// Key for the status of `job_id`
    pub fn job_status(job_id: &JobId) -> Self {
        Self {
            scope: JOB_STATUS_SCOPE,
            job_id: job_id.clone(),
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }
}

impl fmt::Display for JobCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.job_id)
    }
}

/// Service for storing the last-observed state of jobs
///
/// Pollers watching a job write its key; other writers may refresh it too.
pub trait JobCache: Send + Sync {
    /// Returns the cached job, if any
    fn get(&self, key: &JobCacheKey) -> Option<Job>;

    /// Inserts or refreshes an entry
    fn insert(&self, key: JobCacheKey, job: Job);

    /// Removes an entry, returning it if it was present
    fn evict(&self, key: &JobCacheKey) -> Option<Job>;
}

/// In-memory implementation of JobCache
///
/// Uses Arc<Mutex<HashMap>> so one cache can be shared by many pollers
/// running on different tasks.
#[derive(Clone, Default)]
pub struct InMemoryJobCache {
    entries: Arc<Mutex<HashMap<JobCacheKey, Job>>>,
}

impl InMemoryJobCache {
    /// Creates a new, empty cache
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<JobCacheKey, Job>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JobCache for InMemoryJobCache {
    fn get(&self, key: &JobCacheKey) -> Option<Job> {
        self.entries().get(key).cloned()
    }

    fn insert(&self, key: JobCacheKey, job: Job) {
        self.entries().insert(key, job);
    }

    fn evict(&self, key: &JobCacheKey) -> Option<Job> {
        self.entries().remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::domain::job::JobStatus;

    #[test]
    fn test_key_is_scoped() {
        let key = JobCacheKey::job_status(&JobId::from("job-1"));
        assert_eq!(key.scope(), "job-status");
        assert_eq!(key.job_id().as_str(), "job-1");
        assert_eq!(key.to_string(), "job-status/job-1");
    }

    #[test]
    fn test_insert_get_evict() {
        let cache = InMemoryJobCache::new();
        let id = JobId::from("job-1");
        let key = JobCacheKey::job_status(&id);

        cache.insert(key.clone(), Job::new(id.clone(), JobStatus::Pending));
        assert_eq!(cache.get(&key).map(|j| j.status), Some(JobStatus::Pending));

        cache.insert(key.clone(), Job::new(id, JobStatus::Processing));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).map(|j| j.status), Some(JobStatus::Processing));

        assert!(cache.evict(&key).is_some());
        assert!(cache.get(&key).is_none());
        assert!(cache.evict(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = InMemoryJobCache::new();
        let other = cache.clone();
        let id = JobId::from("job-2");

        cache.insert(JobCacheKey::job_status(&id), Job::new(id.clone(), JobStatus::Pending));
        assert!(other.get(&JobCacheKey::job_status(&id)).is_some());
    }

    #[test]
    fn test_keys_do_not_collide() {
        let cache = InMemoryJobCache::new();
        let a = JobId::from("a");
        let b = JobId::from("b");

        cache.insert(JobCacheKey::job_status(&a), Job::new(a.clone(), JobStatus::Pending));
        cache.insert(JobCacheKey::job_status(&b), Job::new(b.clone(), JobStatus::Failed));

        cache.evict(&JobCacheKey::job_status(&a));
        assert!(cache.get(&JobCacheKey::job_status(&a)).is_none());
        assert!(cache.get(&JobCacheKey::job_status(&b)).is_some());
    }
}
