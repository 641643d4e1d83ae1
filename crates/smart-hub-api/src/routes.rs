//! HTTP handlers for settings, sensor readings and history

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hub_engine::{
    Command, GraphPoint, HubError, Reading, SettingsRecord, SettingsRequest, SunsetLookup,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AppState;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<HubError> for ApiError {
    fn from(e: HubError) -> Self {
        if e.is_client_error() {
            Self::BadRequest(e.to_string())
        } else if e.is_not_found() {
            Self::NotFound(e.to_string())
        } else {
            Self::Internal(e.to_string())
        }
    }
}

// Malformed bodies and query strings are client input errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Error body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Graph query parameters
#[derive(Deserialize)]
pub struct GraphQuery {
    /// Number of readings to return (1-500)
    size: usize,
}

/// Health check
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Replace the device settings
pub async fn put_settings<L: SunsetLookup>(
    State(state): State<AppState<L>>,
    request: Result<Json<SettingsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = request?;
    let applied = state.hub.apply_settings(request).await?;
    let status = if applied.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(applied.settings.to_record())))
}

/// Current settings (diagnostic)
pub async fn get_settings<L: SunsetLookup>(
    State(state): State<AppState<L>>,
) -> Result<Json<SettingsRecord>, ApiError> {
    let settings = state.hub.current_settings().await?;
    Ok(Json(settings.to_record()))
}

/// Record a sensor reading and answer with fan/light commands
pub async fn post_reading<L: SunsetLookup>(
    State(state): State<AppState<L>>,
    reading: Result<Json<Reading>, JsonRejection>,
) -> Result<Json<Command>, ApiError> {
    let Json(reading) = reading?;
    Ok(Json(state.hub.ingest(reading).await))
}

/// Most recent readings, newest first
pub async fn get_graph<L: SunsetLookup>(
    State(state): State<AppState<L>>,
    query: Result<Query<GraphQuery>, QueryRejection>,
) -> Result<Json<Vec<GraphPoint>>, ApiError> {
    let Query(query) = query?;
    let readings = state.hub.recent_readings(query.size).await?;
    Ok(Json(readings.into_iter().map(GraphPoint::from).collect()))
}
