//! In-memory Hourglass server for integration tests.
//!
//! Implements the time log and time booking endpoints of the Redmine
//! Hourglass plugin against an in-memory store. Every route sits behind an
//! `X-Redmine-API-Key` check, matching the real server's authentication.
//! Tests seed the store directly through `AppState` before spawning the
//! server; the DTOs here are deliberately defined independently from the
//! client crate so integration tests catch schema drift.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
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

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimeBooking {
    pub id: u32,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub time_log_id: u32,
    pub time_entry_id: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
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

#[derive(Serialize)]
struct Page<T> {
    count: u32,
    offset: u32,
    limit: u32,
    records: Vec<T>,
}

/// Store of logs, bookings, and entries, keyed by id.
#[derive(Default)]
pub struct Store {
    next_id: u32,
    pub time_logs: HashMap<u32, TimeLog>,
    pub time_bookings: HashMap<u32, TimeBooking>,
    pub time_entries: HashMap<u32, TimeEntry>,
}

impl Store {
    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    api_key: String,
    db: Db,
}

impl AppState {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            db: Arc::new(RwLock::new(Store::default())),
        }
    }

    /// Insert a time log directly, bypassing HTTP. Must be called from
    /// outside a tokio runtime (tests seed before spawning the server).
    pub fn seed_time_log(&self, log: TimeLog) {
        let mut store = self.db.blocking_write();
        store.next_id = store.next_id.max(log.id);
        store.time_logs.insert(log.id, log);
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/time_logs.json", get(list_time_logs))
        .route("/time_logs/join.json", post(join_time_logs))
        .route("/time_logs/bulk_destroy.json", post(bulk_destroy_time_logs))
        .route(
            "/time_logs/{id}",
            get(get_time_log).put(update_time_log).delete(delete_time_log),
        )
        .route("/time_logs/{id}/book.json", post(book_time_log))
        .route("/time_logs/{id}/split.json", post(split_time_log))
        .route("/time_bookings.json", get(list_time_bookings))
        .route(
            "/time_bookings/bulk_destroy.json",
            post(bulk_destroy_time_bookings),
        )
        .route(
            "/time_bookings/bulk_update.json",
            post(bulk_update_time_bookings),
        )
        .route(
            "/time_bookings/bulk_create.json",
            post(bulk_create_time_bookings),
        )
        .route(
            "/time_bookings/{id}",
            get(get_time_booking)
                .put(update_time_booking)
                .delete(delete_time_booking),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get("x-redmine-api-key")
        .is_some_and(|value| value.as_bytes() == state.api_key.as_bytes());
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

/// Single-resource routes match `{id}` against a whole segment, so the
/// trailing `.json` arrives as part of the parameter.
fn parse_id(raw: &str) -> Result<u32, StatusCode> {
    raw.strip_suffix(".json")
        .and_then(|s| s.parse().ok())
        .ok_or(StatusCode::NOT_FOUND)
}

fn hours_between(start: DateTime<Utc>, stop: DateTime<Utc>) -> f64 {
    (stop - start).num_seconds() as f64 / 3600.0
}

fn paginate<T>(mut records: Vec<T>, offset: u32, limit: u32, key: impl Fn(&T) -> u32) -> Page<T> {
    records.sort_by_key(|r| key(r));
    let count = records.len() as u32;
    let records = records
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Page {
        count,
        offset,
        limit,
        records,
    }
}

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    offset: u32,
    #[serde(default = "default_limit")]
    limit: u32,
    date: Option<String>,
}

fn default_limit() -> u32 {
    25
}

/// Parse the Hourglass date range expression `><{from}|{to}`.
fn parse_date_range(raw: &str) -> Option<(NaiveDate, NaiveDate)> {
    let rest = raw.strip_prefix("><")?;
    let (from, to) = rest.split_once('|')?;
    Some((
        NaiveDate::parse_from_str(from, "%Y-%m-%d").ok()?,
        NaiveDate::parse_from_str(to, "%Y-%m-%d").ok()?,
    ))
}

// ---------------------------------------------------------------------------
// Time logs
// ---------------------------------------------------------------------------

async fn list_time_logs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Page<TimeLog>> {
    let store = state.db.read().await;
    let records: Vec<TimeLog> = store.time_logs.values().cloned().collect();
    Json(paginate(records, params.offset, params.limit, |r| r.id))
}

async fn get_time_log(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<TimeLog>, StatusCode> {
    let id = parse_id(&raw)?;
    let store = state.db.read().await;
    store
        .time_logs
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct TimeLogValues {
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    comments: Option<String>,
    user_id: Option<u32>,
}

#[derive(Deserialize)]
struct UpdateTimeLogRequest {
    time_log: TimeLogValues,
}

async fn update_time_log(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Json(input): Json<UpdateTimeLogRequest>,
) -> Result<StatusCode, StatusCode> {
    let id = parse_id(&raw)?;
    let mut store = state.db.write().await;
    let log = store.time_logs.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let values = input.time_log;
    if let Some(start) = values.start {
        log.start = start;
    }
    if let Some(stop) = values.stop {
        log.stop = stop;
    }
    if let Some(comments) = values.comments {
        log.comments = Some(comments);
    }
    if let Some(user_id) = values.user_id {
        log.user_id = user_id;
    }
    log.hours = hours_between(log.start, log.stop);
    log.updated_at = Utc::now();
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_time_log(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let id = parse_id(&raw)?;
    let mut store = state.db.write().await;
    store
        .time_logs
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct BookingValues {
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    project_id: Option<u32>,
    issue_id: Option<u32>,
    activity_id: Option<u32>,
    user_id: Option<u32>,
    comments: Option<String>,
}

#[derive(Deserialize)]
struct BookRequest {
    time_booking: BookingValues,
}

async fn book_time_log(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(input): Json<BookRequest>,
) -> Result<Json<TimeEntry>, StatusCode> {
    let mut store = state.db.write().await;
    let log = store.time_logs.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?;
    let values = input.time_booking;
    let now = Utc::now();

    let entry = TimeEntry {
        id: store.allocate_id(),
        project_id: values.project_id.unwrap_or(1),
        issue_id: values.issue_id,
        user_id: values.user_id.unwrap_or(log.user_id),
        activity_id: values.activity_id.unwrap_or(1),
        hours: log.hours,
        comments: values.comments,
        spent_on: log.start.date_naive(),
        created_on: now,
        updated_on: now,
    };
    let booking = TimeBooking {
        id: store.allocate_id(),
        start: values.start.unwrap_or(log.start),
        stop: values.stop.unwrap_or(log.stop),
        time_log_id: log.id,
        time_entry_id: entry.id,
        created_at: now,
        updated_at: now,
    };
    store.time_entries.insert(entry.id, entry.clone());
    store.time_bookings.insert(booking.id, booking);
    Ok(Json(entry))
}

#[derive(Deserialize)]
struct JoinRequest {
    time_logs: Vec<u32>,
}

async fn join_time_logs(
    State(state): State<AppState>,
    Json(input): Json<JoinRequest>,
) -> Result<Json<TimeLog>, StatusCode> {
    if input.time_logs.len() < 2 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let mut store = state.db.write().await;
    let mut logs = Vec::with_capacity(input.time_logs.len());
    for id in &input.time_logs {
        logs.push(store.time_logs.get(id).cloned().ok_or(StatusCode::NOT_FOUND)?);
    }

    let mut merged = logs[0].clone();
    merged.start = logs.iter().map(|l| l.start).min().unwrap_or(merged.start);
    merged.stop = logs.iter().map(|l| l.stop).max().unwrap_or(merged.stop);
    merged.hours = logs.iter().map(|l| l.hours).sum();
    merged.updated_at = Utc::now();

    for id in &input.time_logs[1..] {
        store.time_logs.remove(id);
    }
    store.time_logs.insert(merged.id, merged.clone());
    Ok(Json(merged))
}

#[derive(Deserialize)]
struct SplitRequest {
    split_at: DateTime<Utc>,
}

async fn split_time_log(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(input): Json<SplitRequest>,
) -> Result<Json<Vec<TimeLog>>, StatusCode> {
    let mut store = state.db.write().await;
    let log = store.time_logs.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?;
    if input.split_at <= log.start || input.split_at >= log.stop {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let now = Utc::now();
    let mut first = log.clone();
    first.stop = input.split_at;
    first.hours = hours_between(first.start, first.stop);
    first.updated_at = now;

    let second = TimeLog {
        id: store.allocate_id(),
        start: input.split_at,
        stop: log.stop,
        hours: hours_between(input.split_at, log.stop),
        user_id: log.user_id,
        comments: log.comments,
        created_at: now,
        updated_at: now,
    };

    store.time_logs.insert(first.id, first.clone());
    store.time_logs.insert(second.id, second.clone());
    Ok(Json(vec![first, second]))
}

async fn bulk_destroy_time_logs(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> StatusCode {
    let mut store = state.db.write().await;
    for (key, value) in params {
        if key == "time_logs[]" {
            if let Ok(id) = value.parse::<u32>() {
                store.time_logs.remove(&id);
            }
        }
    }
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Time bookings
// ---------------------------------------------------------------------------

async fn list_time_bookings(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<TimeBooking>>, StatusCode> {
    let range = match params.date.as_deref() {
        Some(raw) => Some(parse_date_range(raw).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let store = state.db.read().await;
    let records: Vec<TimeBooking> = store
        .time_bookings
        .values()
        .filter(|b| match range {
            Some((from, to)) => {
                let date = b.start.date_naive();
                date >= from && date <= to
            }
            None => true,
        })
        .cloned()
        .collect();
    Ok(Json(paginate(records, params.offset, params.limit, |r| r.id)))
}

async fn get_time_booking(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<TimeBooking>, StatusCode> {
    let id = parse_id(&raw)?;
    let store = state.db.read().await;
    store
        .time_bookings
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct UpdateTimeBookingRequest {
    time_booking: BookingValues,
}

async fn update_time_booking(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Json(input): Json<UpdateTimeBookingRequest>,
) -> Result<StatusCode, StatusCode> {
    let id = parse_id(&raw)?;
    let mut store = state.db.write().await;
    let booking = store
        .time_bookings
        .get_mut(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let values = input.time_booking;
    if let Some(start) = values.start {
        booking.start = start;
    }
    if let Some(stop) = values.stop {
        booking.stop = stop;
    }
    booking.updated_at = Utc::now();
    let entry_id = booking.time_entry_id;
    if let Some(entry) = store.time_entries.get_mut(&entry_id) {
        if let Some(project_id) = values.project_id {
            entry.project_id = project_id;
        }
        if let Some(activity_id) = values.activity_id {
            entry.activity_id = activity_id;
        }
        if let Some(comments) = values.comments {
            entry.comments = Some(comments);
        }
        entry.updated_on = Utc::now();
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_time_booking(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let id = parse_id(&raw)?;
    let mut store = state.db.write().await;
    store
        .time_bookings
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn bulk_destroy_time_bookings(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> StatusCode {
    let mut store = state.db.write().await;
    for (key, value) in params {
        if key == "time_bookings[]" {
            if let Ok(id) = value.parse::<u32>() {
                store.time_bookings.remove(&id);
            }
        }
    }
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
struct BulkUpdateValues {
    id: u32,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    project_id: Option<u32>,
    issue_id: Option<u32>,
    activity_id: Option<u32>,
    comments: Option<String>,
}

#[derive(Deserialize)]
struct BulkUpdateRequest {
    /// Keyed `additionalPropN`; only the values matter to the mock.
    time_bookings: HashMap<String, BulkUpdateValues>,
}

async fn bulk_update_time_bookings(
    State(state): State<AppState>,
    Json(input): Json<BulkUpdateRequest>,
) -> Result<StatusCode, StatusCode> {
    let mut store = state.db.write().await;
    for values in input.time_bookings.into_values() {
        let booking = store
            .time_bookings
            .get_mut(&values.id)
            .ok_or(StatusCode::NOT_FOUND)?;
        if let Some(start) = values.start {
            booking.start = start;
        }
        if let Some(stop) = values.stop {
            booking.stop = stop;
        }
        booking.updated_at = Utc::now();
        let entry_id = booking.time_entry_id;
        if let Some(entry) = store.time_entries.get_mut(&entry_id) {
            if let Some(project_id) = values.project_id {
                entry.project_id = project_id;
            }
            if let Some(issue_id) = values.issue_id {
                entry.issue_id = Some(issue_id);
            }
            if let Some(activity_id) = values.activity_id {
                entry.activity_id = activity_id;
            }
            if let Some(comments) = values.comments {
                entry.comments = Some(comments);
            }
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct BulkCreateValues {
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
    project_id: u32,
    activity_id: u32,
    issue_id: Option<u32>,
    user_id: Option<u32>,
    comments: Option<String>,
}

#[derive(Deserialize)]
struct BulkCreateRequest {
    time_bookings: Vec<BulkCreateValues>,
}

async fn bulk_create_time_bookings(
    State(state): State<AppState>,
    Json(input): Json<BulkCreateRequest>,
) -> StatusCode {
    let mut store = state.db.write().await;
    let now = Utc::now();
    for values in input.time_bookings {
        let hours = hours_between(values.start, values.stop);
        let log = TimeLog {
            id: store.allocate_id(),
            start: values.start,
            stop: values.stop,
            hours,
            user_id: values.user_id.unwrap_or(1),
            comments: values.comments.clone(),
            created_at: now,
            updated_at: now,
        };
        let entry = TimeEntry {
            id: store.allocate_id(),
            project_id: values.project_id,
            issue_id: values.issue_id,
            user_id: log.user_id,
            activity_id: values.activity_id,
            hours,
            comments: values.comments,
            spent_on: values.start.date_naive(),
            created_on: now,
            updated_on: now,
        };
        let booking = TimeBooking {
            id: store.allocate_id(),
            start: values.start,
            stop: values.stop,
            time_log_id: log.id,
            time_entry_id: entry.id,
            created_at: now,
            updated_at: now,
        };
        store.time_logs.insert(log.id, log);
        store.time_entries.insert(entry.id, entry);
        store.time_bookings.insert(booking.id, booking);
    }
    StatusCode::NO_CONTENT
}
