use super::not_found;
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use utoipa::ToSchema;

/// Create a router to serve health checks.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check).fallback(not_found))
        .route("/api/info", get(build_info).fallback(not_found))
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct HealthStatus {
    status: String,
    message: String,
}

/// Simple `is_alive` endpoint that will always return a 200 OK.
/// Used to indicate when the webserver is up and running.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Check if service is alive", body = HealthStatus))
)]
pub async fn health_check() -> Json<HealthStatus> {
    tracing::debug!("Service is alive");
    Json(HealthStatus {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct BuildInfo {
    name: &'static str,
    version: &'static str,
}

/// Endpoint to get current information about the server's version.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/api/info",
    responses((status = 200, description = "Build info for this service", body = BuildInfo))
)]
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
