//! Time log operations exercised against the live mock server.

mod support;

use std::time::Duration;

use chrono::{TimeZone, Utc};
use hourglass_core::{
    ApiError, Config, HourglassClient, ListFilter, TimeBookingUpdate, TimeLogUpdate,
};
use mock_server::AppState;

use support::{client, sample_log, spawn_server, API_KEY};

#[test]
fn list_returns_one_page_and_echoes_the_window() {
    let state = AppState::new(API_KEY);
    for id in 1..=30 {
        state.seed_time_log(sample_log(id, 6));
    }
    let client = client(&spawn_server(state));

    let filter = ListFilter { offset: 0, limit: 25 };
    let page = client.time_logs().list(&filter).unwrap();
    assert_eq!(page.count, 30);
    assert_eq!(page.offset, 0);
    assert_eq!(page.limit, 25);
    assert_eq!(page.records.len(), 25);

    let rest = client
        .time_logs()
        .list(&ListFilter { offset: 25, limit: 25 })
        .unwrap();
    assert_eq!(rest.records.len(), 5);
}

#[test]
fn get_returns_the_seeded_log() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(18, 6));
    let client = client(&spawn_server(state));

    let log = client.time_logs().get(18).unwrap();
    assert_eq!(log.id, 18);
    assert_eq!(log.hours, 2.5);
}

#[test]
fn get_missing_log_is_not_found_with_the_id() {
    let client = client(&spawn_server(AppState::new(API_KEY)));

    let err = client.time_logs().get(999).unwrap_err();
    assert!(matches!(
        err,
        ApiError::NotFound {
            resource: "time log",
            id: 999
        }
    ));
}

#[test]
fn delete_removes_the_log() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(18, 6));
    let client = client(&spawn_server(state));

    client.time_logs().delete(18).unwrap();
    let err = client.time_logs().get(18).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { id: 18, .. }));

    let err = client.time_logs().delete(18).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { id: 18, .. }));
}

#[test]
fn update_applies_only_the_provided_fields() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(14, 6));
    let client = client(&spawn_server(state));

    let values = TimeLogUpdate {
        comments: Some("bla1".to_string()),
        ..Default::default()
    };
    client.time_logs().update(14, &values).unwrap();

    let log = client.time_logs().get(14).unwrap();
    assert_eq!(log.comments.as_deref(), Some("bla1"));
    assert_eq!(log.hours, 2.5, "untouched fields stay as seeded");
}

#[test]
fn book_creates_a_time_entry_from_the_log() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(18, 6));
    let client = client(&spawn_server(state));

    let values = TimeBookingUpdate {
        comments: Some("blubb".to_string()),
        project_id: Some(2),
        ..Default::default()
    };
    let entry = client.time_logs().book(18, &values).unwrap();
    assert_eq!(entry.comments.as_deref(), Some("blubb"));
    assert_eq!(entry.project_id, 2);
    assert_eq!(entry.hours, 2.5);
    assert_eq!(entry.spent_on, chrono::NaiveDate::from_ymd_opt(2020, 1, 6).unwrap());
}

#[test]
fn join_merges_logs_and_removes_the_rest() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(3, 6));
    state.seed_time_log(sample_log(4, 7));
    let client = client(&spawn_server(state));

    let merged = client.time_logs().join(&[3, 4]).unwrap();
    assert_eq!(merged.id, 3);
    assert_eq!(merged.start, Utc.with_ymd_and_hms(2020, 1, 6, 9, 0, 0).unwrap());
    assert_eq!(merged.stop, Utc.with_ymd_and_hms(2020, 1, 7, 11, 30, 0).unwrap());
    assert_eq!(merged.hours, 5.0);

    let err = client.time_logs().get(4).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { id: 4, .. }));
}

#[test]
fn join_with_one_id_fails_before_any_request() {
    // Nothing is listening on this address; validation must reject first.
    let client = client("http://127.0.0.1:1");

    let err = client.time_logs().join(&[3]).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
fn split_yields_two_adjacent_logs() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(5, 6));
    let client = client(&spawn_server(state));

    let at = Utc.with_ymd_and_hms(2020, 1, 6, 10, 0, 0).unwrap();
    let parts = client.time_logs().split(5, at).unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].stop, at);
    assert_eq!(parts[1].start, at);
    assert_eq!(parts[0].hours + parts[1].hours, 2.5);
}

#[test]
fn split_outside_the_log_is_rejected_by_the_server() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(5, 6));
    let client = client(&spawn_server(state));

    let at = Utc.with_ymd_and_hms(2020, 1, 6, 23, 0, 0).unwrap();
    let err = client.time_logs().split(5, at).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 422, .. }));
}

#[test]
fn bulk_delete_removes_every_listed_log() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(6, 6));
    state.seed_time_log(sample_log(7, 7));
    let client = client(&spawn_server(state));

    client.time_logs().bulk_delete(&[6, 7]).unwrap();
    assert!(matches!(
        client.time_logs().get(6).unwrap_err(),
        ApiError::NotFound { .. }
    ));
    assert!(matches!(
        client.time_logs().get(7).unwrap_err(),
        ApiError::NotFound { .. }
    ));
}

#[test]
fn bulk_delete_of_nothing_sends_no_request() {
    // Unroutable base URL: any network attempt would fail loudly.
    let client = client("http://127.0.0.1:1");

    assert!(client.time_logs().bulk_delete(&[]).is_ok());
}

#[test]
fn elapsed_timeout_surfaces_as_timeout() {
    // A socket that accepts connections but never answers: the connection
    // lands in the kernel backlog and the response never comes.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let config = Config::new(format!("http://{addr}"), API_KEY)
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let client = HourglassClient::new(&config);

    let err = client.time_logs().get(1).unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
    drop(listener);
}

#[test]
fn wrong_api_key_surfaces_as_http_401() {
    let state = AppState::new(API_KEY);
    state.seed_time_log(sample_log(18, 6));
    let base_url = spawn_server(state);

    let config = Config::new(base_url, "wrong-key").unwrap();
    let client = HourglassClient::new(&config);
    let err = client.time_logs().get(18).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }));
}
