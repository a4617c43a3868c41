// Presentation layer - HTTP routes over the diagnostic engine
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Compression is done in the response builders, so no CompressionLayer here.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/reading", get(current_reading))
        .route("/status", get(status_summary))
        .route("/series/:channel", get(rolling_series))
        .route("/warnings", get(warning_log))
        .route("/warnings/counts", get(warning_counts))
        .route("/history", get(history))
        .route("/battery/prediction", get(battery_prediction))
        .route("/thresholds", get(thresholds))
        .route("/thresholds/:field", put(set_threshold))
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/events", get(events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
