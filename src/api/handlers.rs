use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::AppState;
use crate::components::feed_fetcher::BasicAuth;
use crate::service::EventQuery;
use crate::utils::params::{clamp_int, parse_flag, parse_limit};

/// Accepted range for `lookback_days`
pub const LOOKBACK_RANGE: (i64, i64) = (0, 90);
/// Accepted range for `horizon_days`
pub const HORIZON_RANGE: (i64, i64) = (1, 3660);

/// Query string of `GET /events`.
///
/// Numbers are taken as text so that malformed values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct EventsParams {
    pub url: Option<String>,
    pub limit: Option<String>,
    pub lookback_days: Option<String>,
    pub horizon_days: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tz: Option<String>,
    pub include_ended: Option<String>,
}

/// Handler for the index page
pub async fn index_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the ICS Calendar API!",
        "usage": "GET /events?url=<ics_url>&limit=<number_of_events, Default: Infinite>"
    }))
}

/// Handler for the event listing
pub async fn events_handler(
    State(state): State<AppState>,
    Query(params): Query<EventsParams>,
) -> Response {
    let Some(url) = params.url.filter(|url| !url.trim().is_empty()) else {
        return error_response("No URL provided".to_string());
    };

    // Clamp values to avoid abuse / extreme ranges
    let (min_lookback, max_lookback) = LOOKBACK_RANGE;
    let (min_horizon, max_horizon) = HORIZON_RANGE;
    let query = EventQuery {
        url,
        auth: BasicAuth::from_parts(params.username, params.password),
        lookback_days: clamp_int(
            params.lookback_days.as_deref(),
            min_lookback,
            max_lookback,
            state.default_lookback_days.clamp(min_lookback, max_lookback),
        ),
        horizon_days: clamp_int(
            params.horizon_days.as_deref(),
            min_horizon,
            max_horizon,
            state.default_horizon_days.clamp(min_horizon, max_horizon),
        ),
        limit: parse_limit(params.limit.as_deref()),
        include_ended: parse_flag(params.include_ended.as_deref()),
        timezone: params.tz.filter(|tz| !tz.trim().is_empty()),
    };

    match state.service.get_events(query).await {
        Ok(events) => Json(json!({ "events": events })).into_response(),
        Err(e) => {
            error!("Failed to retrieve events: {}", e);
            error_response(format!("Failed to retrieve events: {}", e))
        }
    }
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}

fn error_response(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
