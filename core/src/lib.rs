//! Synchronous client for the Redmine Hourglass time-tracking REST API.
//!
//! # Overview
//! Typed methods map one-to-one onto the Hourglass HTTP endpoints for time
//! logs and time bookings: list, get, update, delete, book, join, split,
//! and the bulk variants. Each call is a single stateless request/response
//! exchange — no retries, no caching, no local state.
//!
//! # Design
//! - `HourglassClient` holds one shared transport (base URL, API key,
//!   optional timeout) and hands out per-resource clients.
//! - Each operation validates its arguments, builds an `HttpRequest` as
//!   plain data, executes it through the transport, and maps the response
//!   to a typed result; request construction stays testable without a
//!   server.
//! - Errors are a tagged enum: 404 on single-resource get/delete becomes
//!   `NotFound` carrying the id, argument problems become `Validation`
//!   before any request is sent, everything else propagates as-is.
//! - Failure paths are logged via `tracing` and propagated unchanged;
//!   installing a subscriber is the host's decision.

pub mod client;
pub mod error;
pub mod http;
pub mod time_bookings;
pub mod time_logs;
mod transport;
pub mod types;

pub use client::{Config, HourglassClient};
pub use error::ApiError;
pub use time_bookings::TimeBookingsClient;
pub use time_logs::TimeLogsClient;
pub use types::{
    ListFilter, PaginatedResult, TimeBooking, TimeBookingBulkCreate, TimeBookingBulkUpdate,
    TimeBookingListQuery, TimeBookingUpdate, TimeEntry, TimeLog, TimeLogUpdate,
};
