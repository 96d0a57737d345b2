use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use std::any::Any;
use utoipa::ToSchema;

pub mod contact;
pub mod docs;
pub mod health;

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .merge(health::create_router())
        .merge(contact::create_router(&app_state))
        .merge(docs::create_router())
        .merge(crate::metrics::create_router())
        .fallback(not_found)
        .with_state(app_state)
}

/// The `{ success, message }` body shared by most JSON responses.
#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Unknown paths, and methods a path does not serve.
#[tracing::instrument]
pub(crate) async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiMessage::failure("Route not found")),
    )
}

/// Turn a panic inside a handler into the generic error response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic.message = details, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiMessage::failure("Something went wrong!")),
    )
        .into_response()
}
