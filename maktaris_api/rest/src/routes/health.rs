use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use chrono::{DateTime, Utc};
use maktaris_core_health_contracts::HealthFeatureService;
use serde::Serialize;

pub fn router(service: Arc<impl HealthFeatureService>, environment: &'static str) -> Router<()> {
    Router::new()
        .route("/api/health", routing::get(health))
        .with_state((service, environment))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    environment: &'static str,
    memory_usage: Option<u64>,
}

async fn health(
    State((service, environment)): State<(Arc<impl HealthFeatureService>, &'static str)>,
) -> Response {
    let report = service.report().await;

    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let response = HealthResponse {
        status: if report.healthy { "healthy" } else { "unhealthy" },
        timestamp: report.timestamp,
        environment,
        memory_usage: report.memory_usage,
    };

    (status, Json(response)).into_response()
}
