//! Integration tests for the HTTP API contract
//!
//! Drives the full router (sampling cache + history store behind it) with
//! in-process requests and asserts on the wire shapes.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use enviro_station::api::{router, AppState};
use enviro_station::clock::FixedTimeSource;
use enviro_station::config::FailurePolicy;
use enviro_station::error::{Result, StationError};
use enviro_station::history::HistoryStore;
use enviro_station::sampling::SamplingCache;
use enviro_station::sensor::{Measurement, SensorDriver};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower::ServiceExt;

/// Driver that plays back a fixed script of results
struct ScriptedSensor {
    script: Mutex<VecDeque<Result<Measurement>>>,
}

impl ScriptedSensor {
    fn new(script: Vec<Result<Measurement>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }
}

#[async_trait]
impl SensorDriver for ScriptedSensor {
    async fn sample(&self) -> Result<Measurement> {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(StationError::sensor("script exhausted")))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn ok(temp: f64, hum: f64) -> Result<Measurement> {
    Ok(Measurement {
        temperature: temp,
        humidity: hum,
    })
}

fn fail() -> Result<Measurement> {
    Err(StationError::sensor("no response"))
}

struct TestStation {
    app: Router,
    history: Arc<HistoryStore>,
    _dir: tempfile::TempDir,
}

fn station(
    script: Vec<Result<Measurement>>,
    min_interval: Duration,
    on_failure: FailurePolicy,
) -> TestStation {
    let dir = tempfile::tempdir().unwrap();
    let history = Arc::new(HistoryStore::new(dir.path().join("history.json")));
    let cache = Arc::new(SamplingCache::new(
        ScriptedSensor::new(script),
        history.clone(),
        Arc::new(FixedTimeSource::new("2024-01-01", "08:00")),
        min_interval,
    ));

    let state = AppState {
        cache,
        history: history.clone(),
        started_at: Instant::now(),
        on_failure,
    };

    TestStation {
        app: router(state, true),
        history,
        _dir: dir,
    }
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn current_data_serves_rounded_values_and_uptime() {
    let ts = station(
        vec![ok(21.46, 40.04)],
        Duration::from_secs(2),
        FailurePolicy::ServeLastKnown,
    );

    let (status, body) = get_json(&ts.app, "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temp"], 21.5);
    assert_eq!(body["hum"], 40.0);
    assert!(body["ts"].is_u64());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn no_successful_sample_yields_sensor_error_marker() {
    let ts = station(
        vec![fail()],
        Duration::from_secs(2),
        FailurePolicy::ServeLastKnown,
    );

    let (status, body) = get_json(&ts.app, "/api/data").await;
    // Device alive, sensor not warmed up: still a 200, error in the body
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "sensor");
    assert!(body["ts"].is_u64());
    assert!(body.get("temp").is_none());
}

#[tokio::test]
async fn serve_last_known_policy_keeps_old_values_through_a_failure() {
    let ts = station(
        vec![ok(21.5, 40.0), fail()],
        Duration::from_millis(50),
        FailurePolicy::ServeLastKnown,
    );

    let (_, body) = get_json(&ts.app, "/api/data").await;
    assert_eq!(body["temp"], 21.5);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let (status, body) = get_json(&ts.app, "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temp"], 21.5);
    assert_eq!(body["hum"], 40.0);
}

#[tokio::test]
async fn error_only_policy_reports_failure_despite_old_values() {
    let ts = station(
        vec![ok(21.5, 40.0), fail()],
        Duration::from_millis(50),
        FailurePolicy::ErrorOnly,
    );

    let (_, body) = get_json(&ts.app, "/api/data").await;
    assert_eq!(body["temp"], 21.5);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let (status, body) = get_json(&ts.app, "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "sensor");
    assert!(body.get("temp").is_none());
}

#[tokio::test]
async fn history_scenario_two_appends_then_queries() {
    let ts = station(vec![], Duration::from_secs(2), FailurePolicy::ServeLastKnown);

    ts.history
        .append(
            "2024-01-01",
            "08:00",
            Measurement {
                temperature: 21.5,
                humidity: 40.0,
            },
        )
        .await
        .unwrap();
    ts.history
        .append(
            "2024-01-01",
            "08:05",
            Measurement {
                temperature: 21.7,
                humidity: 41.0,
            },
        )
        .await
        .unwrap();

    let (status, body) = get_json(&ts.app, "/api/history?date=2024-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([
            {"time": "08:00", "temp": 21.5, "hum": 40.0},
            {"time": "08:05", "temp": 21.7, "hum": 41.0},
        ])
    );

    let (status, body) = get_json(&ts.app, "/api/history?date=2024-01-02").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn missing_date_parameter_is_a_client_error() {
    let ts = station(vec![], Duration::from_secs(2), FailurePolicy::ServeLastKnown);

    let (status, body) = get_json(&ts.app, "/api/history").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("date"));
}

#[tokio::test]
async fn sampled_reading_becomes_queryable_history() {
    let ts = station(
        vec![ok(21.5, 40.0)],
        Duration::from_secs(2),
        FailurePolicy::ServeLastKnown,
    );

    let (_, body) = get_json(&ts.app, "/api/data").await;
    assert_eq!(body["temp"], 21.5);

    let (_, body) = get_json(&ts.app, "/api/history?date=2024-01-01").await;
    assert_eq!(
        body,
        serde_json::json!([{"time": "08:00", "temp": 21.5, "hum": 40.0}])
    );
}

#[tokio::test]
async fn corrupt_store_serves_empty_history_not_an_error() {
    let ts = station(vec![], Duration::from_secs(2), FailurePolicy::ServeLastKnown);

    tokio::fs::write(ts.history.path(), "{definitely not json")
        .await
        .unwrap();

    let (status, body) = get_json(&ts.app, "/api/history?date=2024-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}
