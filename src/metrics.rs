use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::StatusCode;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// How a contact submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Invalid,
    Malformed,
    RateLimited,
    Failed,
}

impl Outcome {
    const ALL: [Outcome; 5] = [
        Self::Sent,
        Self::Invalid,
        Self::Malformed,
        Self::RateLimited,
        Self::Failed,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Invalid => "invalid",
            Self::Malformed => "malformed",
            Self::RateLimited => "rate_limited",
            Self::Failed => "failed",
        }
    }
}

pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_submissions_total",
                "Contact form submissions by outcome",
            ),
            &["outcome"],
        )
        .context("Failed to create `contact_submissions_total` counter")?;
        registry
            .register(Box::new(submissions.clone()))
            .context("Failed to register `contact_submissions_total` metric")?;

        // Export every outcome from the start instead of only once it happens.
        for outcome in Outcome::ALL {
            submissions.with_label_values(&[outcome.as_str()]);
        }

        Ok(Self {
            registry,
            submissions,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.submissions
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.submissions
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    fn encode(&self) -> anyhow::Result<String> {
        let mut buffer = vec![];
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;

        String::from_utf8(buffer).context("Failed to convert metrics to a valid string")
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new().route(
        "/metrics",
        get(metrics_endpoint).fallback(crate::routes::not_found),
    )
}

/// Expose all metrics in the Prometheus text format.
#[tracing::instrument(skip(metrics))]
#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Metrics in the Prometheus text format", body = String))
)]
pub async fn metrics_endpoint(State(metrics): State<Arc<Metrics>>) -> Result<String, MetricsError> {
    metrics.encode().map_err(MetricsError::UnexpectedError)
}

#[derive(thiserror::Error)]
pub enum MetricsError {
    #[error("Unexpected error when generating metrics")]
    UnexpectedError(#[source] anyhow::Error),
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        tracing::error!(error.cause_chain = ?self, "Failed to serve metrics");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
