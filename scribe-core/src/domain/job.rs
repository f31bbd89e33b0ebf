//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message reported for a failed job whose record carries no `error`
pub const DEFAULT_FAILURE_MESSAGE: &str = "Job failed";

/// Opaque, server-assigned job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Asynchronous unit of work executed by the backend
///
/// Only `id` and `status` are guaranteed; every other field is optional on
/// the wire and defaults to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<JobKind>,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a bare job record with only an id and a status
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            kind: None,
            input: None,
            result: None,
            error: None,
            created_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Sets the failure description
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Sets the success payload
    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Failure description, falling back to [`DEFAULT_FAILURE_MESSAGE`]
    pub fn failure_message(&self) -> String {
        match self.error.as_deref() {
            Some(error) if !error.trim().is_empty() => error.to_string(),
            _ => DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Checks that `result` is set only when completed and `error` only when failed
    pub fn is_consistent(&self) -> bool {
        let result_ok = self.result.is_none() || self.status == JobStatus::Completed;
        let error_ok = self.error.is_none() || self.status == JobStatus::Failed;
        result_ok && error_ok
    }
}

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// `Completed` and `Failed` are terminal; the job never changes again
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// What a job produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    TitleGeneration,
    OutlineGeneration,
    BlogGeneration,
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_format() {
        let status: JobStatus = serde_json::from_value(json!("PROCESSING")).unwrap();
        assert_eq!(status, JobStatus::Processing);
        assert_eq!(serde_json::to_value(JobStatus::Failed).unwrap(), json!("FAILED"));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_minimal_job_deserializes() {
        let job: Job = serde_json::from_value(json!({ "id": "job-1", "status": "PENDING" })).unwrap();
        assert_eq!(job.id.as_str(), "job-1");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
        assert!(job.kind.is_none());
    }

    #[test]
    fn test_full_job_deserializes() {
        let job: Job = serde_json::from_value(json!({
            "id": "job-9",
            "status": "COMPLETED",
            "type": "OUTLINE_GENERATION",
            "input": { "titleId": "t-1" },
            "result": { "outline": ["intro", "body"] },
            "error": null,
            "createdAt": "2024-01-01T10:00:00Z",
            "startedAt": "2024-01-01T10:00:05Z",
            "completedAt": "2024-01-01T10:01:00Z"
        }))
        .unwrap();

        assert_eq!(job.kind, Some(JobKind::OutlineGeneration));
        assert!(job.started_at.is_some());
        assert!(job.completed_at.is_some());
        assert!(job.is_consistent());
    }

    #[test]
    fn test_unknown_kind_maps_to_other() {
        let job: Job = serde_json::from_value(json!({
            "id": "job-3",
            "status": "PENDING",
            "type": "IMAGE_GENERATION"
        }))
        .unwrap();
        assert_eq!(job.kind, Some(JobKind::Other));
    }

    #[test]
    fn test_failure_message_fallback() {
        let failed = Job::new("job-2", JobStatus::Failed).with_error("Oh no");
        assert_eq!(failed.failure_message(), "Oh no");

        let silent = Job::new("job-2", JobStatus::Failed);
        assert_eq!(silent.failure_message(), DEFAULT_FAILURE_MESSAGE);

        let blank = Job::new("job-2", JobStatus::Failed).with_error("  ");
        assert_eq!(blank.failure_message(), DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_consistency_check() {
        assert!(Job::new("a", JobStatus::Completed).with_result(json!({})).is_consistent());
        assert!(Job::new("a", JobStatus::Failed).with_error("x").is_consistent());
        assert!(!Job::new("a", JobStatus::Pending).with_error("x").is_consistent());
        assert!(!Job::new("a", JobStatus::Failed).with_result(json!(1)).is_consistent());
    }

    #[test]
    fn test_blank_job_id_is_empty() {
        assert!(JobId::from("").is_empty());
        assert!(JobId::from("   ").is_empty());
        assert!(!JobId::from("job-1").is_empty());
    }
}
