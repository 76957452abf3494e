pub mod handlers;

use crate::service::EventService;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::{events_handler, health_handler, index_handler};

/// Shared state of the HTTP API
#[derive(Clone)]
pub struct AppState {
    pub service: EventService,
    /// Lookback used when a request does not give one
    pub default_lookback_days: i64,
    /// Horizon used when a request does not give one
    pub default_horizon_days: i64,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
