use crate::{dispatcher::NotificationDispatcher, metrics::Metrics, rate_limit::RateLimiter};
use axum::extract::FromRef;
use duplicate::duplicate_item;
use std::sync::Arc;

/// Everything a request handler may need, shared between all requests.
#[derive(Debug, Clone)]
pub struct AppState {
    dispatcher: Arc<NotificationDispatcher>,
    rate_limiter: Arc<RateLimiter>,
    metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        dispatcher: NotificationDispatcher,
        rate_limiter: RateLimiter,
        metrics: Metrics,
    ) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            rate_limiter: Arc::new(rate_limiter),
            metrics: Arc::new(metrics),
        }
    }
}

#[duplicate_item(
    service_type               field;
    [ NotificationDispatcher ] [ dispatcher ];
    [ RateLimiter ]            [ rate_limiter ];
    [ Metrics ]                [ metrics ];
)]
impl FromRef<AppState> for Arc<service_type> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.field.clone()
    }
}
