//! Jobs repository
//!
//! Performs one read of a job's current state given its identifier.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scribe_client::ScribeClient;
use scribe_core::domain::job::{Job, JobId};
use std::sync::Arc;

/// Repository trait for reading job state
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Fetches the job as currently known to the server
    ///
    /// Transport failures, missing jobs and undecodable bodies are returned
    /// as errors. Whether to retry is up to the caller.
    ///
    /// # Arguments
    /// * `job_id` - The job to read
    async fn fetch_job(&self, job_id: &JobId) -> Result<Job>;
}

/// HTTP implementation of JobRepository
pub struct HttpJobRepository {
    client: Arc<ScribeClient>,
}

impl HttpJobRepository {
    /// Creates a new HTTP job repository
    ///
    /// # Arguments
    /// * `client` - Shared API client
    pub fn new(client: Arc<ScribeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobRepository for HttpJobRepository {
    async fn fetch_job(&self, job_id: &JobId) -> Result<Job> {
        self.client
            .get_job(job_id)
            .await
            .with_context(|| format!("Failed to fetch job {}", job_id))
    }
}
