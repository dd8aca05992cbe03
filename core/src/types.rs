//! Domain DTOs mirroring the Hourglass plugin's JSON shapes.
//!
//! # Design
//! Entities (`TimeLog`, `TimeBooking`, `TimeEntry`) are immutable snapshots
//! of server state at fetch time; the client never mutates them in place.
//! Update payloads model every field as `Option` with
//! `skip_serializing_if = "Option::is_none"` so "not provided" is omitted
//! from the body entirely — the server then leaves that field unchanged.
//! These types are defined independently from the mock-server crate;
//! integration tests catch schema drift.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A recorded block of time, not yet necessarily booked against an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLog {
    pub id: u32,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub hours: f64,
    pub user_id: u32,
    #[serde(default)]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled block of time linking a time log to a Redmine time entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBooking {
    pub id: u32,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub time_log_id: u32,
    pub time_entry_id: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A Redmine time entry, as produced by booking a time log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u32,
    pub project_id: u32,
    #[serde(default)]
    pub issue_id: Option<u32>,
    pub user_id: u32,
    pub activity_id: u32,
    pub hours: f64,
    #[serde(default)]
    pub comments: Option<String>,
    pub spent_on: NaiveDate,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Partial update for a time log. Omitted fields remain unchanged on the
/// server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeLogUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u32>,
}

/// Partial update for a time booking. Also the payload of a book operation,
/// where it supplies the booking details for the new time entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeBookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// One element of a bulk update: the id of the booking to change plus the
/// fields to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBookingBulkUpdate {
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// One element of a bulk create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBookingBulkCreate {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub project_id: u32,
    pub activity_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// One page of a list resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// Total number of records on the server, not the page size.
    pub count: u32,
    pub offset: u32,
    pub limit: u32,
    pub records: Vec<T>,
}

/// Offset/limit window for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub offset: u32,
    pub limit: u32,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 25,
        }
    }
}

/// List window plus an optional date range for time bookings.
///
/// When either bound is set, the list URL gains a `date=><from|to` range
/// expression; a missing bound defaults to the remote API's representable
/// minimum or maximum date.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeBookingListQuery {
    pub filter: ListFilter,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
