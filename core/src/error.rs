//! Error types for the Hourglass API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status"; it carries the requested id so error messages can name the
//! missing record. `Validation` covers caller-supplied arguments that break
//! an invariant and is raised before any request leaves the process. All
//! other non-2xx responses land in `Http` with the raw status code and body
//! for debugging.

use std::fmt;

/// Errors returned by the Hourglass client.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 404 — the requested record does not exist.
    NotFound { resource: &'static str, id: u32 },

    /// A caller-supplied argument violates an invariant. No request was sent.
    Validation(String),

    /// The server returned a non-2xx status other than a mapped 404.
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// A network-level failure occurred while executing the request.
    Transport(String),

    /// The configured timeout elapsed before the server responded.
    Timeout,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound { resource, id } => {
                write!(f, "{resource} with id {id} not found")
            }
            ApiError::Validation(msg) => write!(f, "invalid argument: {msg}"),
            ApiError::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            ApiError::Deserialization(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::Serialization(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::Transport(msg) => write!(f, "transport failed: {msg}"),
            ApiError::Timeout => write!(f, "request timed out"),
        }
    }
}

impl std::error::Error for ApiError {}
