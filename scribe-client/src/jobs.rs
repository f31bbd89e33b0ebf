//! Job-related API endpoints

use crate::ScribeClient;
use crate::error::{ClientError, Result};
use scribe_core::domain::job::{Job, JobId};
use scribe_core::dto::envelope::Envelope;
use scribe_core::dto::job::{GenerateBlog, GenerateOutline, GenerateTitles, extract_job_id};
use reqwest::Url;
use serde::Serialize;
use tracing::debug;

/// Decode a job body, unwrapping a `{ "data": ... }` envelope if present
///
/// # Example
/// ```
/// use scribe_client::decode_job;
///
/// let wrapped = decode_job(r#"{"data":{"id":"job-1","status":"PENDING"}}"#).unwrap();
/// let bare = decode_job(r#"{"id":"job-1","status":"PENDING"}"#).unwrap();
/// assert_eq!(wrapped, bare);
/// ```
pub fn decode_job(body: &str) -> Result<Job> {
    serde_json::from_str::<Envelope<Job>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse job: {}", e)))
}

impl ScribeClient {
    // =============================================================================
    // Job Status
    // =============================================================================

    /// Get a job by ID
    ///
    /// Performs a single read of `GET /jobs/{jobId}`. Nothing is retried here;
    /// retry policy belongs to the caller.
    ///
    /// # Arguments
    /// * `job_id` - The job identifier, must not be blank
    ///
    /// # Returns
    /// The job as currently known to the server
    pub async fn get_job(&self, job_id: &JobId) -> Result<Job> {
        if job_id.is_empty() {
            return Err(ClientError::InvalidRequest(
                "job id must not be empty".to_string(),
            ));
        }

        let url = self.job_url(job_id)?;
        let response = self.authorize(self.client.get(url)).send().await?;
        let body = self
            .read_body(response, &format!("job {}", job_id))
            .await?;

        decode_job(&body)
    }

    /// `{base_url}/jobs/{jobId}` with the id percent-encoded as one path segment
    fn job_url(&self, job_id: &JobId) -> Result<Url> {
        let mut url = Url::parse(&self.url("/jobs")).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid API URL {}: {}", self.base_url(), e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("API URL {} cannot carry a path", self.base_url()))
            })?
            .push(job_id.as_str());
        Ok(url)
    }

    // =============================================================================
    // Job Creation
    // =============================================================================

    /// Start a title-generation job for a calendar date
    ///
    /// # Example
    /// ```no_run
    /// # use scribe_client::ScribeClient;
    /// # use scribe_core::dto::job::GenerateTitles;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ScribeClient::new("http://localhost:3000/api");
    /// let job_id = client.create_title_job(GenerateTitles {
    ///     date: "2024-01-01".to_string(),
    ///     topic: Some("rust".to_string()),
    ///     count: Some(5),
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_title_job(&self, req: GenerateTitles) -> Result<JobId> {
        self.create_job("/titles/generate", &req).await
    }

    /// Start an outline-generation job for a title
    pub async fn create_outline_job(&self, req: GenerateOutline) -> Result<JobId> {
        self.create_job("/outlines/generate", &req).await
    }

    /// Start a blog-generation job for an outline
    pub async fn create_blog_job(&self, req: GenerateBlog) -> Result<JobId> {
        self.create_job("/blogs/generate", &req).await
    }

    /// POST a creation request and pull the job id out of the response
    async fn create_job<B: Serialize>(&self, path: &str, body: &B) -> Result<JobId> {
        let url = self.url(path);
        let response = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await?;

        let value: serde_json::Value = self.handle_response(response, path).await?;
        let job_id = extract_job_id(&value).ok_or_else(|| ClientError::MissingJobId {
            endpoint: path.to_string(),
        })?;

        debug!("Created job {} via {}", job_id, path);
        Ok(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::domain::job::JobStatus;

    #[test]
    fn test_decode_enveloped_job() {
        let job = decode_job(r#"{"data":{"id":"job-1","status":"COMPLETED","result":{"n":1}}}"#)
            .unwrap();
        assert_eq!(job.id.as_str(), "job-1");
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.result.is_some());
    }

    #[test]
    fn test_decode_round_trip_is_identical() {
        let wrapped = decode_job(r#"{"data":{"id":"job-7","status":"PROCESSING"}}"#).unwrap();
        let bare = decode_job(r#"{"id":"job-7","status":"PROCESSING"}"#).unwrap();
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn test_decode_rejects_unknown_status() {
        let err = decode_job(r#"{"id":"job-1","status":"EXPLODED"}"#).unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_get_job_rejects_blank_id_without_network() {
        // Port 9 (discard) is never contacted: validation happens first.
        let client = ScribeClient::new("http://127.0.0.1:9");
        let err = client.get_job(&JobId::from("")).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[test]
    fn test_job_url_keeps_id_in_one_segment() {
        let client = ScribeClient::new("http://localhost:3000/api/");

        let url = client.job_url(&JobId::from("job-1")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/jobs/job-1");

        let url = client.job_url(&JobId::from("a/b?c#d")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/jobs/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_job_url_rejects_malformed_base() {
        let client = ScribeClient::new("not a url");
        let err = client.job_url(&JobId::from("job-1")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
