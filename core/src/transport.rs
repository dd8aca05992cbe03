//! ureq-backed execution of built requests.
//!
//! # Design
//! The transport is the only place in the crate that touches the network.
//! It owns the base URL and the API key: resource clients build requests
//! with relative paths and no credentials, and every outgoing request gets
//! the `X-Redmine-API-Key` header attached here (the Redmine convention).
//!
//! ureq's status-code-as-error behavior is disabled so 4xx/5xx responses
//! come back as data; interpreting status codes belongs to the resource
//! clients. The configured timeout is the cancellation surface: when it
//! triggers, the in-flight request is aborted and the call returns
//! `ApiError::Timeout`.

use crate::client::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Executes `HttpRequest` values against the configured Hourglass server.
///
/// Holds no mutable state; a single transport is shared by all resource
/// clients and may be used from multiple threads concurrently.
pub(crate) struct Transport {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl Transport {
    pub(crate) fn new(config: &Config) -> Self {
        let mut builder = ureq::Agent::config_builder().http_status_as_error(false);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout_global(Some(timeout));
        }
        Self {
            agent: builder.build().new_agent(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Perform one HTTP round-trip and surface the raw status and body.
    pub(crate) fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = format!("{}/{}", self.base_url, request.path);

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => self
                .agent
                .get(&url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .call(),
            (HttpMethod::Delete, _) => self
                .agent
                .delete(&url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self
                .agent
                .post(&url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self
                .agent
                .put(&url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .send_empty(),
        };

        let mut response = result.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

fn map_transport_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Timeout(..) => ApiError::Timeout,
        other => ApiError::Transport(other.to_string()),
    }
}
