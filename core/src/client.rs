//! Client configuration and the entry point to the resource clients.
//!
//! # Design
//! `HourglassClient` holds one shared transport and carries no mutable
//! state between calls; the per-resource clients returned by `time_logs()`
//! and `time_bookings()` are cheap clones over the same transport and may
//! be used concurrently from multiple threads. Each operation is split into
//! a request-building step (validated before anything leaves the process),
//! one transport round-trip, and a response-parsing step; the shared status
//! and JSON helpers live here.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::time_bookings::TimeBookingsClient;
use crate::time_logs::TimeLogsClient;
use crate::transport::Transport;

/// Connection settings for an Hourglass server.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    /// Upper bound for one round-trip. `None` means no client-side limit.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Validates that both the base URL and the API key are non-empty.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let api_key = api_key.into();
        if base_url.trim().is_empty() {
            return Err(ApiError::Validation("base URL must not be empty".to_string()));
        }
        if api_key.trim().is_empty() {
            return Err(ApiError::Validation("API key must not be empty".to_string()));
        }
        Ok(Self {
            base_url,
            api_key,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Entry point to the Hourglass API.
#[derive(Clone)]
pub struct HourglassClient {
    transport: Arc<Transport>,
}

impl HourglassClient {
    pub fn new(config: &Config) -> Self {
        Self {
            transport: Arc::new(Transport::new(config)),
        }
    }

    /// Operations on time logs.
    pub fn time_logs(&self) -> TimeLogsClient {
        TimeLogsClient::new(Arc::clone(&self.transport))
    }

    /// Operations on time bookings.
    pub fn time_bookings(&self) -> TimeBookingsClient {
        TimeBookingsClient::new(Arc::clone(&self.transport))
    }
}

/// Serialize a request payload, mapping failures to `ApiError`.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Accept any 2xx response, otherwise surface the status and body.
pub(crate) fn ensure_success(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

/// Like `ensure_success`, but maps 404 to `NotFound` carrying the requested
/// id. Used by single-resource get and delete.
pub(crate) fn ensure_found(
    response: &HttpResponse,
    resource: &'static str,
    id: u32,
) -> Result<(), ApiError> {
    if response.status == 404 {
        return Err(ApiError::NotFound { resource, id });
    }
    ensure_success(response)
}

/// Deserialize a 2xx response body into `T`.
pub(crate) fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Pass-through logging on failure paths: errors are recorded and
/// propagated unchanged, never swallowed. `NotFound` is an expected
/// outcome the caller handles and `Validation` is an argument check that
/// fires before anything is sent, so neither is logged.
pub(crate) fn trace_failure<T>(
    operation: &'static str,
    result: Result<T, ApiError>,
) -> Result<T, ApiError> {
    result.inspect_err(|e| {
        if !matches!(e, ApiError::NotFound { .. } | ApiError::Validation(_)) {
            tracing::error!(operation, error = %e, "hourglass request failed");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_empty_base_url() {
        let err = Config::new("", "key").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn config_rejects_blank_api_key() {
        let err = Config::new("http://localhost:3000", "  ").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn ensure_success_accepts_any_2xx() {
        for status in [200, 201, 204] {
            let response = HttpResponse {
                status,
                headers: Vec::new(),
                body: String::new(),
            };
            assert!(ensure_success(&response).is_ok());
        }
    }

    #[test]
    fn ensure_found_maps_404_to_not_found_with_id() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        let err = ensure_found(&response, "time log", 18).unwrap_err();
        assert!(matches!(
            err,
            ApiError::NotFound {
                resource: "time log",
                id: 18
            }
        ));
    }

    #[test]
    fn trace_failure_propagates_every_error_unchanged() {
        let err = trace_failure::<()>("op", Err(ApiError::Serialization("cycle".to_string())))
            .unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));

        let err = trace_failure::<()>("op", Err(ApiError::Validation("empty".to_string())))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn ensure_found_passes_other_failures_through() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "boom".to_string(),
        };
        let err = ensure_found(&response, "time log", 18).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
    }
}
