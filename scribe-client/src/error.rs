//! Error types for the Scribe client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Scribe client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A job-creation response did not carry a job id
    #[error("Response from {endpoint} did not contain a job id")]
    MissingJobId {
        /// Endpoint that produced the response
        endpoint: String,
    },
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ClientError::api_error(404, "gone").is_not_found());
        assert!(ClientError::NotFound("job-1".into()).is_not_found());
        assert!(ClientError::api_error(422, "bad").is_client_error());
        assert!(!ClientError::api_error(422, "bad").is_server_error());
        assert!(ClientError::api_error(503, "down").is_server_error());
    }

    #[test]
    fn test_missing_job_id_message() {
        let err = ClientError::MissingJobId {
            endpoint: "/titles/generate".into(),
        };
        assert_eq!(
            err.to_string(),
            "Response from /titles/generate did not contain a job id"
        );
    }
}
