//! Job DTOs for the content-generation API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::job::JobId;

/// Request to generate blog titles for a calendar date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTitles {
    /// Calendar date the titles are planned for (e.g. "2024-01-01")
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Request to generate an outline for an existing title
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutline {
    pub title_id: String,
}

/// Request to generate a full blog post from an existing outline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBlog {
    pub outline_id: String,
}

/// Finds the job id in a job-creation response
///
/// Locations are probed in order: `jobId`, `id`, `data.id`. Blank strings
/// are skipped so a later location can still match.
pub fn extract_job_id(body: &Value) -> Option<JobId> {
    let candidates = [
        body.get("jobId"),
        body.get("id"),
        body.get("data").and_then(|data| data.get("id")),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .map(JobId::from)
        .find(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_id_probe_order() {
        let body = json!({ "jobId": "a", "id": "b", "data": { "id": "c" } });
        assert_eq!(extract_job_id(&body), Some(JobId::from("a")));

        let body = json!({ "id": "b", "data": { "id": "c" } });
        assert_eq!(extract_job_id(&body), Some(JobId::from("b")));

        let body = json!({ "data": { "id": "c" } });
        assert_eq!(extract_job_id(&body), Some(JobId::from("c")));
    }

    #[test]
    fn test_missing_job_id() {
        assert_eq!(extract_job_id(&json!({ "status": "PENDING" })), None);
        assert_eq!(extract_job_id(&json!({ "jobId": "" })), None);
        assert_eq!(extract_job_id(&json!({ "jobId": null })), None);
        assert_eq!(extract_job_id(&json!([])), None);
    }

    #[test]
    fn test_numeric_job_id() {
        assert_eq!(extract_job_id(&json!({ "id": 42 })), Some(JobId::from("42")));
    }

    #[test]
    fn test_optional_fields_are_skipped() {
        let req = GenerateTitles {
            date: "2024-01-01".to_string(),
            topic: None,
            count: Some(5),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "date": "2024-01-01", "count": 5 })
        );
    }
}
