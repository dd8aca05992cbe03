//! HTTP request and response types used between construction and execution.
//!
//! # Design
//! These types describe HTTP exchanges as plain data. The resource clients
//! build `HttpRequest` values (paths relative to the configured base URL)
//! and interpret `HttpResponse` values; the `transport` module is the only
//! place that touches the network. Keeping the seam as plain data makes
//! request construction and status interpretation testable without a
//! server.
//!
//! All fields use owned types (`String`, `Vec`) so values can be moved
//! across threads freely.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// `path` is relative to the configured base URL; authentication is the
/// transport's concern and is never part of the built request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A bodyless request for `method` and `path`.
    pub(crate) fn new(method: HttpMethod, path: String) -> Self {
        Self {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A request carrying a JSON `body`.
    pub(crate) fn with_json(method: HttpMethod, path: String, body: String) -> Self {
        Self {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }
}

/// An HTTP response described as plain data.
///
/// Produced by the transport after executing an `HttpRequest`, then handed
/// to the resource clients for status mapping and deserialization.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
