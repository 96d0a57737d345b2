use super::{not_found, ApiMessage};
use crate::{
    dispatcher::{DispatchError, NotificationDispatcher},
    domain::{ContactForm, FieldError, Submission, ValidationErrors},
    metrics::{Metrics, Outcome},
    rate_limit::rate_limit,
    state::AppState,
};
use axum::{
    async_trait,
    body::HttpBody,
    extract::{FromRequest, State},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    BoxError, Form, Json, Router,
};
use std::sync::Arc;
use utoipa::ToSchema;

/// Create a router to serve the contact form endpoint.
/// Only submissions count against the rate limit; other methods are a 404.
pub fn create_router(app_state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/api/contact",
        post(contact)
            .route_layer(middleware::from_fn_with_state(
                app_state.clone(),
                rate_limit,
            ))
            .fallback(not_found),
    )
}

/// Validate a contact form submission and email it to the site owner.
#[tracing::instrument(
    name = "Handle contact submission",
    skip_all,
    fields(sender_email = tracing::field::Empty)
)]
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactForm,
    responses(
        (status = 200, description = "Both emails were sent", body = ApiMessage),
        (status = 400, description = "The submission is invalid", body = ValidationFailure),
        (status = 429, description = "Too many submissions from this client", body = String),
        (status = 500, description = "The emails could not be sent", body = ApiMessage),
    )
)]
pub async fn contact(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    State(metrics): State<Arc<Metrics>>,
    payload: Result<ContactPayload, ContactError>,
) -> Result<Json<ApiMessage>, ContactError> {
    let outcome = submit(&dispatcher, payload).await;
    metrics.record(match &outcome {
        Ok(_) => Outcome::Sent,
        Err(e) => e.outcome(),
    });
    outcome
}

async fn submit(
    dispatcher: &NotificationDispatcher,
    payload: Result<ContactPayload, ContactError>,
) -> Result<Json<ApiMessage>, ContactError> {
    let ContactPayload(form) = payload?;
    let submission = Submission::parse(form)?;
    tracing::Span::current().record(
        "sender_email",
        &tracing::field::display(submission.email()),
    );

    dispatcher.dispatch(&submission).await?;

    Ok(Json(ApiMessage::success("Message sent successfully!")))
}

/// A contact form decoded from either a JSON or an url-encoded body.
#[derive(Debug)]
pub struct ContactPayload(pub ContactForm);

#[async_trait]
impl<S, B> FromRequest<S, B> for ContactPayload
where
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = ContactError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let form = if is_form {
            Form::<ContactForm>::from_request(req, state)
                .await
                .map_err(|e| ContactError::MalformedBody(e.body_text()))?
                .0
        } else {
            Json::<ContactForm>::from_request(req, state)
                .await
                .map_err(|e| ContactError::MalformedBody(e.body_text()))?
                .0
        };

        Ok(Self(form))
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct ValidationFailure {
    pub success: bool,
    pub errors: Vec<FieldError>,
}

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Failed to deliver the contact notifications")]
    Dispatch(#[from] DispatchError),
}

impl ContactError {
    fn outcome(&self) -> Outcome {
        match self {
            Self::MalformedBody(_) => Outcome::Malformed,
            Self::Validation(_) => Outcome::Invalid,
            Self::Dispatch(_) => Outcome::Failed,
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        match self {
            Self::MalformedBody(ref reason) => {
                tracing::info!(reason = %reason, "Rejected a malformed contact request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiMessage::failure("Invalid request body")),
                )
                    .into_response()
            }
            Self::Validation(errors) => {
                tracing::info!(
                    fields = ?errors.fields().collect::<Vec<_>>(),
                    "Rejected an invalid contact submission"
                );
                (
                    StatusCode::BAD_REQUEST,
                    Json(ValidationFailure {
                        success: false,
                        errors: errors.into_inner(),
                    }),
                )
                    .into_response()
            }
            Self::Dispatch(ref e) => {
                tracing::error!(
                    error.cause_chain = ?self,
                    owner_notified = e.owner_notified(),
                    "Failed to send contact notifications"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiMessage::failure(
                        "Failed to send message. Please try again later.",
                    )),
                )
                    .into_response()
            }
        }
    }
}
