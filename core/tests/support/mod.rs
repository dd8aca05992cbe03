//! Shared glue for the integration tests: spawns the mock Hourglass server
//! on a random port and builds a client pointed at it.

#![allow(dead_code)]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use hourglass_core::{Config, HourglassClient};
use mock_server::{AppState, TimeLog};

pub const API_KEY: &str = "integration-key";

/// Start the mock server on a random port in a background thread and
/// return its base URL. Seed `state` before calling this.
pub fn spawn_server(state: AppState) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, state).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

pub fn client(base_url: &str) -> HourglassClient {
    let config = Config::new(base_url, API_KEY)
        .unwrap()
        .with_timeout(Duration::from_secs(5));
    HourglassClient::new(&config)
}

/// A 9:00-11:30 log on January `day`, so `hours` is always 2.5.
pub fn sample_log(id: u32, day: u32) -> TimeLog {
    let start = Utc.with_ymd_and_hms(2020, 1, day, 9, 0, 0).unwrap();
    let stop = Utc.with_ymd_and_hms(2020, 1, day, 11, 30, 0).unwrap();
    TimeLog {
        id,
        start,
        stop,
        hours: 2.5,
        user_id: 1,
        comments: None,
        created_at: stop,
        updated_at: stop,
    }
}
