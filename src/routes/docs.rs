use crate::{
    domain::{ContactForm, FieldError},
    routes::{contact::ValidationFailure, health, not_found, ApiMessage},
    state::AppState,
};
use axum::{
    http::{
        header::{self, ACCEPT},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use utoipa::OpenApi;

/// Documentation for the service. Can be converted into JSON or YAML.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::build_info,
        crate::routes::contact::contact,
        crate::metrics::metrics_endpoint,
    ),
    components(schemas(
        health::HealthStatus,
        health::BuildInfo,
        ContactForm,
        FieldError,
        ApiMessage,
        ValidationFailure,
    ))
)]
struct ApiDoc;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/docs/openapi", get(serve_openapi_docs).fallback(not_found))
        .route(
            "/api/docs/openapi.json",
            get(serve_openapi_docs_as_json).fallback(not_found),
        )
        .route(
            "/api/docs/openapi.yaml",
            get(serve_openapi_docs_as_yaml).fallback(not_found),
        )
}

/// Serve OpenApi docs based on the `Accept` header.
#[tracing::instrument(skip(headers))]
pub async fn serve_openapi_docs(headers: HeaderMap) -> Response {
    match headers.get(ACCEPT).and_then(|x| x.to_str().ok()) {
        Some("application/yaml") => serve_openapi_docs_as_yaml().await,
        _ => serve_openapi_docs_as_json().await,
    }
}

/// Endpoint to serve OpenApi docs as JSON.
#[tracing::instrument]
pub async fn serve_openapi_docs_as_json() -> Response {
    match ApiDoc::openapi().to_json() {
        Ok(docs) => ([(header::CONTENT_TYPE, "application/json")], docs).into_response(),
        Err(e) => docs_unavailable(e),
    }
}

/// Endpoint to serve OpenApi docs as YAML.
#[tracing::instrument]
pub async fn serve_openapi_docs_as_yaml() -> Response {
    match ApiDoc::openapi().to_yaml() {
        Ok(docs) => ([(header::CONTENT_TYPE, "application/yaml")], docs).into_response(),
        Err(e) => docs_unavailable(e),
    }
}

fn docs_unavailable(e: impl std::error::Error) -> Response {
    tracing::error!(error = %e, "Failed to serialize the OpenApi docs");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
