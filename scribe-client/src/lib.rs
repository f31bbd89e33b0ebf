//! Scribe HTTP Client
//!
//! A small, type-safe HTTP client for the content-generation API.
//!
//! It covers the two halves of the job contract the dashboard relies on:
//! starting a generation job (titles, outlines, blog posts) and reading a
//! job's current state while it runs.
//!
//! # Example
//!
//! ```no_run
//! use scribe_client::ScribeClient;
//! use scribe_core::dto::job::GenerateTitles;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ScribeClient::new("http://localhost:3000/api");
//!
//!     let job_id = client.create_title_job(GenerateTitles {
//!         date: "2024-01-01".to_string(),
//!         topic: None,
//!         count: None,
//!     }).await?;
//!
//!     let job = client.get_job(&job_id).await?;
//!     println!("Job {} is {}", job.id, job.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use jobs::decode_job;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the content-generation API
///
/// Authentication is handled by an external identity provider; the client
/// only forwards an opaque bearer token when one is configured.
#[derive(Debug, Clone)]
pub struct ScribeClient {
    /// Base URL of the API (e.g., "http://localhost:3000/api")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token issued by the identity provider
    token: Option<String>,
}

impl ScribeClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "http://localhost:3000/api")
    ///
    /// # Example
    /// ```
    /// use scribe_client::ScribeClient;
    ///
    /// let client = ScribeClient::new("http://localhost:3000/api");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use scribe_client::ScribeClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ScribeClient::with_client("http://localhost:3000/api", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and return the raw body text
    ///
    /// `404` maps to [`ClientError::NotFound`] carrying `resource`; any other
    /// non-success status maps to [`ClientError::ApiError`].
    async fn read_body(&self, response: reqwest::Response, resource: &str) -> Result<String> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(resource.to_string()));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        let body = self.read_body(response, resource).await?;

        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ScribeClient::new("http://localhost:3000/api");
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert!(client.token.is_none());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ScribeClient::new("http://localhost:3000/api/");
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.url("/jobs/a"), "http://localhost:3000/api/jobs/a");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = ScribeClient::with_client("http://localhost:3000", http_client);
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let client = ScribeClient::new("http://localhost:3000").with_token("  ");
        assert!(client.token.is_none());

        let client = ScribeClient::new("http://localhost:3000").with_token("abc");
        assert_eq!(client.token.as_deref(), Some("abc"));
    }
}
