//! Health check

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use recipebox_storage::LocalStorage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub uploads: String,
    pub profile_pictures: String,
    pub checked_at: DateTime<Utc>,
}

async fn check_storage(storage: &LocalStorage) -> String {
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);
    match tokio::time::timeout(timeout, storage.is_writable()).await {
        Ok(true) => "healthy".to_string(),
        Ok(false) => "not writable".to_string(),
        Err(_) => "timeout".to_string(),
    }
}

/// Liveness plus writability of both storage roots
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service healthy", body = HealthCheckResponse),
        (status = 503, description = "A storage root is not writable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (uploads, profile_pictures) = tokio::join!(
        check_storage(&state.storage.uploads),
        check_storage(&state.storage.profile_pictures)
    );

    let healthy = uploads == "healthy" && profile_pictures == "healthy";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            uploads,
            profile_pictures,
            checked_at: Utc::now(),
        }),
    )
}
