// HTTP request handlers
use crate::application::dashboard_service::DashboardError;
use crate::application::telemetry_source::IngestError;
use crate::domain::dashboard::Dashboard;
use crate::domain::period::SamplePeriod;
use crate::domain::sensor::Sensor;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub period: Option<String>,
    pub refresh: Option<bool>,
}

/// JSON error payload; every failure is terminal for the render cycle, so
/// there is exactly one status and message per response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        let status = match &err {
            DashboardError::UnknownSensor(_) => StatusCode::NOT_FOUND,
            // A reference that never looked like a URL is a configuration
            // problem on our side, not the remote's.
            DashboardError::Ingest(IngestError::InvalidSourceReference { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DashboardError::Ingest(IngestError::SourceUnavailable { .. })
            | DashboardError::Ingest(IngestError::MissingChannel { .. }) => StatusCode::BAD_GATEWAY,
        };
        ApiError::new(status, err.to_string())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authorize(headers: &HeaderMap, state: &AppState) -> Result<(), ApiError> {
    match bearer_token(headers) {
        Some(token) if state.sessions.is_authorized(token) => Ok(()),
        _ => Err(ApiError::unauthorized()),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    match state.sessions.login(&request.password) {
        Some(token) => Ok(Json(LoginResponse { token })),
        None => Err(ApiError::new(StatusCode::UNAUTHORIZED, "invalid password")),
    }
}

pub async fn logout(headers: HeaderMap, State(state): State<Arc<AppState>>) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.logout(token);
    }
    StatusCode::NO_CONTENT
}

/// List all configured sensors for the selector
pub async fn list_sensors(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Sensor>>, ApiError> {
    authorize(&headers, &state)?;
    Ok(Json(state.sensor_service.list_sensors()))
}

/// Build the dashboard for a specific sensor over the requested window
pub async fn get_dashboard(
    Path(sensor_id): Path<String>,
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Dashboard>, ApiError> {
    authorize(&headers, &state)?;

    // Default window: the last 7 calendar days, ending today.
    let end = query.end.unwrap_or_else(|| Utc::now().date_naive());
    let start = query.start.unwrap_or_else(|| end - Duration::days(6));
    if start > end {
        return Err(ApiError::bad_request(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    let period = match query.period.as_deref() {
        Some(token) => token
            .parse::<SamplePeriod>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => SamplePeriod::Day,
    };
    let refresh = query.refresh.unwrap_or(false);

    let dashboard = state
        .dashboard_service
        .get_dashboard(&sensor_id, start, end, period, refresh)
        .await
        .map_err(|e| {
            tracing::error!("dashboard for {} failed: {}", sensor_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(dashboard))
}
