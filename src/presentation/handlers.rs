// HTTP request handlers
use crate::application::engine::ConnectionState;
use crate::domain::prediction::BatteryPrediction;
use crate::domain::reading::SeriesChannel;
use crate::domain::thresholds::ThresholdField;
use crate::error::ThresholdError;
use crate::infrastructure::event_stream::stream_from_receiver;
use crate::infrastructure::http_response::{error_response, respond};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pseudo-channel served next to the rolling series.
const BATTERY_USAGE_CHANNEL: &str = "batteryUsage";

#[derive(Deserialize)]
pub struct ThresholdUpdate {
    pub value: f64,
}

#[derive(Serialize)]
struct PredictionBody {
    message: String,
    #[serde(flatten)]
    prediction: BatteryPrediction,
}

#[derive(Serialize)]
struct ConnectionBody {
    state: ConnectionState,
    changed: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn current_reading(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    match state.engine.current_reading().await {
        Some(reading) => respond(&headers, StatusCode::OK, &reading).await,
        None => error_response(StatusCode::NOT_FOUND, "no reading yet").await,
    }
}

pub async fn status_summary(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    match state.engine.status_summary().await {
        Some(summary) => respond(&headers, StatusCode::OK, &summary).await,
        None => error_response(StatusCode::NOT_FOUND, "no reading yet").await,
    }
}

pub async fn rolling_series(
    Path(channel): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    if channel == BATTERY_USAGE_CHANNEL {
        let usage = state.engine.battery_usage().await;
        return respond(&headers, StatusCode::OK, &usage).await;
    }

    match channel.parse::<SeriesChannel>() {
        Ok(channel) => {
            let points = state.engine.rolling_series(channel).await;
            respond(&headers, StatusCode::OK, &points).await
        }
        Err(e) => error_response(StatusCode::NOT_FOUND, &e).await,
    }
}

pub async fn warning_log(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let warnings = state.engine.warning_log().await;
    respond(&headers, StatusCode::OK, &warnings).await
}

pub async fn warning_counts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let tallies = state.engine.warning_tallies().await;
    respond(&headers, StatusCode::OK, &tallies).await
}

pub async fn history(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let records = state.engine.history().await;
    respond(&headers, StatusCode::OK, &records).await
}

pub async fn battery_prediction(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let prediction = state.engine.battery_prediction().await;
    let body = PredictionBody {
        message: prediction.to_string(),
        prediction,
    };
    respond(&headers, StatusCode::OK, &body).await
}

pub async fn thresholds(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    respond(&headers, StatusCode::OK, &state.engine.thresholds()).await
}

pub async fn set_threshold(
    Path(field): Path<ThresholdField>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(update): Json<ThresholdUpdate>,
) -> Response<Body> {
    match state.engine.set_threshold(field, update.value).await {
        Ok(config) => respond(&headers, StatusCode::OK, &config).await,
        Err(e @ (ThresholdError::NotFinite { .. } | ThresholdError::Ordering { .. })) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()).await
        }
        Err(e) => {
            tracing::error!("Threshold {} updated but not saved: {}", field, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).await
        }
    }
}

pub async fn connect(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let changed = state.engine.connect().await;
    let body = ConnectionBody {
        state: state.engine.connection_state().await,
        changed,
    };
    respond(&headers, StatusCode::OK, &body).await
}

pub async fn disconnect(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let changed = state.engine.disconnect().await;
    let body = ConnectionBody {
        state: state.engine.connection_state().await,
        changed,
    };
    respond(&headers, StatusCode::OK, &body).await
}

/// Stream engine events as they happen
pub async fn events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_receiver(state.engine.subscribe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::engine::{DEFAULT_TICK_INTERVAL, DiagnosticEngine};
    use crate::application::simulator::ReadingSource;
    use crate::domain::reading::nominal_reading;
    use crate::infrastructure::alert_sink::TracingAlertSink;
    use crate::infrastructure::memory_store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::Value;

    async fn app_state() -> Arc<AppState> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut n = 0;
        let source: Box<dyn ReadingSource> = Box::new(move || {
            let mut reading = nominal_reading(start + Duration::hours(n));
            reading.battery_level = 80.0 - 10.0 * n as f64;
            n += 1;
            reading
        });
        let engine = DiagnosticEngine::load(
            Arc::new(MemoryStore::new()),
            source,
            Arc::new(TracingAlertSink::new()),
            DEFAULT_TICK_INTERVAL,
        )
        .await;
        Arc::new(AppState { engine })
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_reading_is_404_before_first_tick() {
        let state = app_state().await;
        let response = current_reading(HeaderMap::new(), State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = status_summary(HeaderMap::new(), State(state)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_connect_tick_and_read_back() {
        let state = app_state().await;

        let body = body_json(connect(HeaderMap::new(), State(state.clone())).await).await;
        assert_eq!(body["state"], "Connected");
        assert_eq!(body["changed"], true);
        let body = body_json(connect(HeaderMap::new(), State(state.clone())).await).await;
        assert_eq!(body["changed"], false);

        state.engine.tick().await;
        state.engine.tick().await;

        let reading = body_json(current_reading(HeaderMap::new(), State(state.clone())).await).await;
        assert_eq!(reading["batteryLevel"], 70.0);

        let status = body_json(status_summary(HeaderMap::new(), State(state.clone())).await).await;
        assert_eq!(status["overall"], "Good");

        let usage = body_json(
            rolling_series(Path("batteryUsage".into()), HeaderMap::new(), State(state.clone())).await,
        )
        .await;
        assert_eq!(usage.as_array().unwrap().len(), 2);

        let prediction = body_json(battery_prediction(HeaderMap::new(), State(state.clone())).await).await;
        assert_eq!(prediction["kind"], "estimate");
        assert_eq!(prediction["hours"], 7.0);
        assert_eq!(prediction["message"], "Estimated battery life: 7.0 hours");

        let history = body_json(history(HeaderMap::new(), State(state.clone())).await).await;
        assert_eq!(history.as_array().unwrap().len(), 2);

        let body = body_json(disconnect(HeaderMap::new(), State(state)).await).await;
        assert_eq!(body["state"], "Disconnected");
        assert_eq!(body["changed"], true);
    }

    #[tokio::test]
    async fn test_warning_counts_flag_repeated_kinds() {
        let state = app_state().await;
        state.engine.connect().await;
        // Battery drops 10 points per tick and goes below 20% on the eighth.
        for _ in 0..9 {
            state.engine.tick().await;
        }

        let counts = body_json(warning_counts(HeaderMap::new(), State(state.clone())).await).await;
        assert_eq!(counts["Battery Level"]["count"], 2);
        assert_eq!(counts["Battery Level"]["repeated"], false);

        state.engine.tick().await;
        let counts = body_json(warning_counts(HeaderMap::new(), State(state.clone())).await).await;
        assert_eq!(counts["Battery Level"]["count"], 3);
        assert_eq!(counts["Battery Level"]["repeated"], true);
        assert!(counts.get("Engine Temperature").is_none());

        state.engine.disconnect().await;
    }

    #[tokio::test]
    async fn test_unknown_series_channel() {
        let state = app_state().await;
        let response = rolling_series(Path("tirePressure".into()), HeaderMap::new(), State(state)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_threshold_update_and_rejection() {
        let state = app_state().await;

        let response = set_threshold(
            Path(ThresholdField::EngineTempHigh),
            HeaderMap::new(),
            State(state.clone()),
            Json(ThresholdUpdate { value: 110.0 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["engineTempHigh"], 110.0);

        let response = set_threshold(
            Path(ThresholdField::EngineTempModerate),
            HeaderMap::new(),
            State(state.clone()),
            Json(ThresholdUpdate { value: 115.0 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let config = body_json(thresholds(HeaderMap::new(), State(state)).await).await;
        assert_eq!(config["engineTempHigh"], 110.0);
        assert_eq!(config["engineTempModerate"], 100.0);
    }
}
