//! Operations on time logs.
//!
//! # Design
//! Every method validates its arguments, builds an `HttpRequest` with a
//! path relative to the base URL, executes it through the shared transport,
//! and maps the response to a typed result. Request construction lives in
//! free functions so the exact paths and bodies are testable without a
//! server.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::client::{ensure_found, ensure_success, parse_body, to_json, trace_failure};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::Transport;
use crate::types::{
    ListFilter, PaginatedResult, TimeBookingUpdate, TimeEntry, TimeLog, TimeLogUpdate,
};

/// Client for the `time_logs` resource.
#[derive(Clone)]
pub struct TimeLogsClient {
    transport: Arc<Transport>,
}

impl TimeLogsClient {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Lists all visible time logs, one page at a time.
    pub fn list(&self, filter: &ListFilter) -> Result<PaginatedResult<TimeLog>, ApiError> {
        let result = list_request(filter)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| {
                ensure_success(&response)?;
                parse_body(&response)
            });
        trace_failure("time_logs.list", result)
    }

    /// Retrieves a time log by its id. A 404 becomes `NotFound` carrying
    /// the id.
    pub fn get(&self, id: u32) -> Result<TimeLog, ApiError> {
        let request = get_request(id);
        let result = self.transport.execute(&request).and_then(|response| {
            ensure_found(&response, "time log", id)?;
            parse_body(&response)
        });
        trace_failure("time_logs.get", result)
    }

    /// Deletes a time log. A 404 becomes `NotFound` carrying the id.
    pub fn delete(&self, id: u32) -> Result<(), ApiError> {
        let request = delete_request(id);
        let result = self
            .transport
            .execute(&request)
            .and_then(|response| ensure_found(&response, "time log", id));
        trace_failure("time_logs.delete", result)
    }

    /// Applies a partial update to a time log. Fields left unset in
    /// `values` remain unchanged on the server.
    pub fn update(&self, id: u32, values: &TimeLogUpdate) -> Result<(), ApiError> {
        let result = update_request(id, values)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| ensure_success(&response));
        trace_failure("time_logs.update", result)
    }

    /// Books a time log against a project, creating a Redmine time entry
    /// from the booking details in `values`.
    pub fn book(&self, id: u32, values: &TimeBookingUpdate) -> Result<TimeEntry, ApiError> {
        let result = book_request(id, values)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| {
                ensure_success(&response)?;
                parse_body(&response)
            });
        trace_failure("time_logs.book", result)
    }

    /// Joins two or more time logs into one, returning the merged log.
    pub fn join(&self, ids: &[u32]) -> Result<TimeLog, ApiError> {
        let result = join_request(ids)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| {
                ensure_success(&response)?;
                parse_body(&response)
            });
        trace_failure("time_logs.join", result)
    }

    /// Splits a time log at the given instant, returning the two resulting
    /// logs.
    pub fn split(&self, id: u32, at: DateTime<Utc>) -> Result<Vec<TimeLog>, ApiError> {
        let result = split_request(id, at)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| {
                ensure_success(&response)?;
                parse_body(&response)
            });
        trace_failure("time_logs.split", result)
    }

    /// Deletes several time logs in one request. An empty id list is a
    /// no-op: no request is sent.
    pub fn bulk_delete(&self, ids: &[u32]) -> Result<(), ApiError> {
        let Some(request) = bulk_delete_request(ids) else {
            return Ok(());
        };
        let result = self
            .transport
            .execute(&request)
            .and_then(|response| ensure_success(&response));
        trace_failure("time_logs.bulk_delete", result)
    }
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    time_log: &'a TimeLogUpdate,
}

#[derive(Serialize)]
struct BookRequest<'a> {
    time_booking: &'a TimeBookingUpdate,
}

#[derive(Serialize)]
struct JoinRequest<'a> {
    time_logs: &'a [u32],
}

#[derive(Serialize)]
struct SplitRequest {
    split_at: DateTime<Utc>,
}

fn list_request(filter: &ListFilter) -> Result<HttpRequest, ApiError> {
    if filter.limit == 0 {
        return Err(ApiError::Validation("limit must be greater than zero".to_string()));
    }
    Ok(HttpRequest::new(
        HttpMethod::Get,
        format!("time_logs.json?offset={}&limit={}", filter.offset, filter.limit),
    ))
}

fn get_request(id: u32) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("time_logs/{id}.json"))
}

fn delete_request(id: u32) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("time_logs/{id}.json"))
}

fn update_request(id: u32, values: &TimeLogUpdate) -> Result<HttpRequest, ApiError> {
    let body = to_json(&UpdateRequest { time_log: values })?;
    Ok(HttpRequest::with_json(
        HttpMethod::Put,
        format!("time_logs/{id}.json"),
        body,
    ))
}

fn book_request(id: u32, values: &TimeBookingUpdate) -> Result<HttpRequest, ApiError> {
    let body = to_json(&BookRequest { time_booking: values })?;
    Ok(HttpRequest::with_json(
        HttpMethod::Post,
        format!("time_logs/{id}/book.json"),
        body,
    ))
}

fn join_request(ids: &[u32]) -> Result<HttpRequest, ApiError> {
    if ids.len() < 2 {
        return Err(ApiError::Validation(
            "joining requires at least two time log ids".to_string(),
        ));
    }
    let body = to_json(&JoinRequest { time_logs: ids })?;
    Ok(HttpRequest::with_json(
        HttpMethod::Post,
        "time_logs/join.json".to_string(),
        body,
    ))
}

fn split_request(id: u32, at: DateTime<Utc>) -> Result<HttpRequest, ApiError> {
    let body = to_json(&SplitRequest { split_at: at })?;
    Ok(HttpRequest::with_json(
        HttpMethod::Post,
        format!("time_logs/{id}/split.json"),
        body,
    ))
}

/// Returns `None` when there is nothing to delete.
///
/// The server expects repeated `time_logs[]={id}` query parameters; the
/// brackets are percent-encoded on the wire.
fn bulk_delete_request(ids: &[u32]) -> Option<HttpRequest> {
    if ids.is_empty() {
        return None;
    }
    let params: Vec<String> = ids.iter().map(|id| format!("time_logs%5B%5D={id}")).collect();
    Some(HttpRequest::new(
        HttpMethod::Post,
        format!("time_logs/bulk_destroy.json?{}", params.join("&")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn list_request_builds_offset_and_limit_query() {
        let filter = ListFilter { offset: 50, limit: 25 };
        let req = list_request(&filter).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "time_logs.json?offset=50&limit=25");
        assert!(req.body.is_none());
    }

    #[test]
    fn list_request_rejects_zero_limit() {
        let filter = ListFilter { offset: 0, limit: 0 };
        let err = list_request(&filter).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn get_request_targets_the_single_resource_path() {
        let req = get_request(18);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "time_logs/18.json");
    }

    #[test]
    fn update_request_wraps_values_and_omits_unset_fields() {
        let values = TimeLogUpdate {
            comments: Some("bla1".to_string()),
            ..Default::default()
        };
        let req = update_request(14, &values).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "time_logs/14.json");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "time_log": { "comments": "bla1" } }));
    }

    #[test]
    fn book_request_wraps_values_in_a_time_booking_envelope() {
        let values = TimeBookingUpdate {
            comments: Some("blubb".to_string()),
            ..Default::default()
        };
        let req = book_request(18, &values).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "time_logs/18/book.json");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "time_booking": { "comments": "blubb" } }));
    }

    #[test]
    fn join_request_posts_the_id_list() {
        let req = join_request(&[3, 4]).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "time_logs/join.json");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "time_logs": [3, 4] }));
    }

    #[test]
    fn join_request_rejects_fewer_than_two_ids() {
        assert!(matches!(join_request(&[]), Err(ApiError::Validation(_))));
        assert!(matches!(join_request(&[3]), Err(ApiError::Validation(_))));
    }

    #[test]
    fn split_request_carries_the_split_instant() {
        let at = Utc.with_ymd_and_hms(2020, 1, 6, 10, 0, 0).unwrap();
        let req = split_request(3, at).unwrap();
        assert_eq!(req.path, "time_logs/3/split.json");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["split_at"], "2020-01-06T10:00:00Z");
    }

    #[test]
    fn bulk_delete_request_repeats_the_id_parameter() {
        let req = bulk_delete_request(&[3, 4]).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.path,
            "time_logs/bulk_destroy.json?time_logs%5B%5D=3&time_logs%5B%5D=4"
        );
    }

    #[test]
    fn bulk_delete_request_is_skipped_for_an_empty_list() {
        assert!(bulk_delete_request(&[]).is_none());
    }
}
