//! HTTP API surface
//!
//! A thin axum layer over the sampling cache and the history store:
//!
//! - `GET /api/data` — current reading as `{"temp", "hum", "ts"}`, or
//!   `{"error": "sensor", "ts"}` when no value can be served. Always 200:
//!   polling clients distinguish "device alive, sensor not ready" from a
//!   transport error by the body, not the status. `ts` is process uptime in
//!   milliseconds.
//! - `GET /api/history?date=YYYY-MM-DD` — the day's entries as a JSON array,
//!   `[]` for unknown dates; a missing `date` parameter is a 400.

use crate::config::FailurePolicy;
use crate::history::HistoryStore;
use crate::sampling::SamplingCache;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::debug;

/// State shared across all HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Sampling cache serving /api/data
    pub cache: Arc<SamplingCache>,

    /// History store serving /api/history
    pub history: Arc<HistoryStore>,

    /// Process start, the zero point of the `ts` field
    pub started_at: Instant,

    /// Policy for failed sampling cycles with a last-known-good reading
    pub on_failure: FailurePolicy,
}

/// Build the API router
pub fn router(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/api/data", get(get_data))
        .route("/api/history", get(get_history))
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Sensor values are reported at the resolution the hardware is good for
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

async fn get_data(State(state): State<AppState>) -> Json<Value> {
    let current = state.cache.current(Instant::now()).await;
    let ts = state.started_at.elapsed().as_millis() as u64;

    let serve = match current.reading {
        None => None,
        Some(reading) if !current.stale => Some(reading),
        Some(reading) => match state.on_failure {
            FailurePolicy::ServeLastKnown => Some(reading),
            FailurePolicy::ErrorOnly => None,
        },
    };

    match serve {
        Some(reading) => Json(json!({
            "temp": round1(reading.measurement.temperature),
            "hum": round1(reading.measurement.humidity),
            "ts": ts,
        })),
        None => Json(json!({
            "error": "sensor",
            "ts": ts,
        })),
    }
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    date: Option<String>,
}

async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let Some(date) = params.date else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "missing 'date' query parameter"})),
        )
            .into_response();
    };

    let day = state.history.query(&date).await;
    debug!(date = %date, entries = day.entries.len(), status = ?day.status, "History query");

    Json(day.entries).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round1(21.449), 21.4);
        assert_eq!(round1(21.45), 21.5);
        assert_eq!(round1(-3.14), -3.1);
    }
}
