//! Liveness, readiness and metrics endpoints.
//!
//! - `/health`: the process is up; checks nothing
//! - `/ready`: database and shared store both answer
//! - `/metrics`: Prometheus text exposition

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe. 200 when the database and the store respond, else 503.
#[tracing::instrument(skip_all, name = "lms.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!(target: "lms.health", error = %e, "Readiness: database check failed");
            "unhealthy"
        }
    };

    let store = match state.store.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(target: "lms.health", error = %e, "Readiness: store check failed");
            "unhealthy"
        }
    };

    if database == "healthy" && store == "healthy" {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                database,
                store,
                error: None,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database,
                store,
                error: Some("Service dependencies unavailable"),
            }),
        )
    }
}

#[tracing::instrument(skip_all, name = "lms.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
