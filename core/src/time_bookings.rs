//! Operations on time bookings.
//!
//! # Design
//! Same shape as the time log client: validate, build a relative request,
//! one transport round-trip, map the response. The two wire quirks of this
//! resource live here: the `date=><from|to` range expression on list URLs
//! and the `additionalPropN` re-keying of bulk updates — the remote API
//! expects an object keyed by arbitrary property names rather than an
//! array, with keys numbered 1-based in list order.

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::client::{ensure_found, ensure_success, parse_body, to_json, trace_failure};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::Transport;
use crate::types::{
    PaginatedResult, TimeBooking, TimeBookingBulkCreate, TimeBookingBulkUpdate,
    TimeBookingListQuery, TimeBookingUpdate,
};

/// Client for the `time_bookings` resource.
#[derive(Clone)]
pub struct TimeBookingsClient {
    transport: Arc<Transport>,
}

impl TimeBookingsClient {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Lists all visible time bookings, optionally restricted to a date
    /// range.
    pub fn list(
        &self,
        query: &TimeBookingListQuery,
    ) -> Result<PaginatedResult<TimeBooking>, ApiError> {
        let result = list_request(query)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| {
                ensure_success(&response)?;
                parse_body(&response)
            });
        trace_failure("time_bookings.list", result)
    }

    /// Retrieves a time booking by its id. A 404 becomes `NotFound`
    /// carrying the id.
    pub fn get(&self, id: u32) -> Result<TimeBooking, ApiError> {
        let request = get_request(id);
        let result = self.transport.execute(&request).and_then(|response| {
            ensure_found(&response, "time booking", id)?;
            parse_body(&response)
        });
        trace_failure("time_bookings.get", result)
    }

    /// Applies a partial update to a time booking. Fields left unset in
    /// `values` remain unchanged on the server.
    pub fn update(&self, id: u32, values: &TimeBookingUpdate) -> Result<(), ApiError> {
        let result = update_request(id, values)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| ensure_success(&response));
        trace_failure("time_bookings.update", result)
    }

    /// Deletes a time booking. A 404 becomes `NotFound` carrying the id.
    pub fn delete(&self, id: u32) -> Result<(), ApiError> {
        let request = delete_request(id);
        let result = self
            .transport
            .execute(&request)
            .and_then(|response| ensure_found(&response, "time booking", id));
        trace_failure("time_bookings.delete", result)
    }

    /// Deletes several time bookings in one request. An empty id list is a
    /// no-op: no request is sent.
    pub fn bulk_delete(&self, ids: &[u32]) -> Result<(), ApiError> {
        let Some(request) = bulk_delete_request(ids) else {
            return Ok(());
        };
        let result = self
            .transport
            .execute(&request)
            .and_then(|response| ensure_success(&response));
        trace_failure("time_bookings.bulk_delete", result)
    }

    /// Updates several time bookings in one request.
    pub fn bulk_update(&self, values: &[TimeBookingBulkUpdate]) -> Result<(), ApiError> {
        let result = bulk_update_request(values)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| ensure_success(&response));
        trace_failure("time_bookings.bulk_update", result)
    }

    /// Creates several time bookings in one request.
    pub fn bulk_create(&self, values: &[TimeBookingBulkCreate]) -> Result<(), ApiError> {
        let result = bulk_create_request(values)
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| ensure_success(&response));
        trace_failure("time_bookings.bulk_create", result)
    }
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    time_booking: &'a TimeBookingUpdate,
}

#[derive(Serialize)]
struct BulkUpdateRequest<'a> {
    time_bookings: KeyedValues<'a>,
}

#[derive(Serialize)]
struct BulkCreateRequest<'a> {
    time_bookings: &'a [TimeBookingBulkCreate],
}

/// Serializes a list as an object keyed `additionalProp1..N` in list
/// order, matching the shape the remote API expects for bulk updates.
struct KeyedValues<'a>(&'a [TimeBookingBulkUpdate]);

impl Serialize for KeyedValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, value) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("additionalProp{}", i + 1), value)?;
        }
        map.end()
    }
}

fn list_request(query: &TimeBookingListQuery) -> Result<HttpRequest, ApiError> {
    if query.filter.limit == 0 {
        return Err(ApiError::Validation("limit must be greater than zero".to_string()));
    }
    let mut path = format!(
        "time_bookings.json?offset={}&limit={}",
        query.filter.offset, query.filter.limit
    );
    if query.from.is_some() || query.to.is_some() {
        let from = query.from.map_or_else(min_filter_date, |d| d.date_naive());
        let to = query.to.map_or_else(max_filter_date, |d| d.date_naive());
        // Decoded form: &date=><{from}|{to}
        path.push_str(&format!(
            "&date=%3E%3C{}%7C{}",
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        ));
    }
    Ok(HttpRequest::new(HttpMethod::Get, path))
}

/// Lower bound used when a range has no `from`; the remote API's earliest
/// representable date.
fn min_filter_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).expect("valid date")
}

/// Upper bound used when a range has no `to`.
fn max_filter_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).expect("valid date")
}

fn get_request(id: u32) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("time_bookings/{id}.json"))
}

fn update_request(id: u32, values: &TimeBookingUpdate) -> Result<HttpRequest, ApiError> {
    let body = to_json(&UpdateRequest { time_booking: values })?;
    Ok(HttpRequest::with_json(
        HttpMethod::Put,
        format!("time_bookings/{id}.json"),
        body,
    ))
}

fn delete_request(id: u32) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("time_bookings/{id}.json"))
}

/// Returns `None` when there is nothing to delete.
fn bulk_delete_request(ids: &[u32]) -> Option<HttpRequest> {
    if ids.is_empty() {
        return None;
    }
    let params: Vec<String> = ids
        .iter()
        .map(|id| format!("time_bookings%5B%5D={id}"))
        .collect();
    Some(HttpRequest::new(
        HttpMethod::Post,
        format!("time_bookings/bulk_destroy.json?{}", params.join("&")),
    ))
}

fn bulk_update_request(values: &[TimeBookingBulkUpdate]) -> Result<HttpRequest, ApiError> {
    let body = to_json(&BulkUpdateRequest {
        time_bookings: KeyedValues(values),
    })?;
    Ok(HttpRequest::with_json(
        HttpMethod::Post,
        "time_bookings/bulk_update.json".to_string(),
        body,
    ))
}

fn bulk_create_request(values: &[TimeBookingBulkCreate]) -> Result<HttpRequest, ApiError> {
    let body = to_json(&BulkCreateRequest { time_bookings: values })?;
    Ok(HttpRequest::with_json(
        HttpMethod::Post,
        "time_bookings/bulk_create.json".to_string(),
        body,
    ))
}
