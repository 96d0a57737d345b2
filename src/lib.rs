pub mod configuration;
pub mod dispatcher;
pub mod domain;
pub mod email_client;
mod error;
pub mod metrics;
pub mod rate_limit;
pub mod routes;
mod state;
pub mod telemetry;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router, Server,
};
use configuration::Settings;
use dispatcher::{NotificationDispatcher, Owner};
use metrics::Metrics;
use rate_limit::RateLimiter;
use state::AppState;
use std::net::{SocketAddr, TcpListener};

/// Response headers added to every response unless a handler already set them.
const SECURITY_HEADERS: [(header::HeaderName, &str); 6] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=15552000; includeSubDomains",
    ),
    (header::X_DNS_PREFETCH_CONTROL, "off"),
    (header::X_XSS_PROTECTION, "0"),
];

#[derive(Debug)]
pub struct App {
    listener: TcpListener,
    router: Router,
}

impl App {
    /// Bind the listener and wire up every dependency of the application.
    pub fn build(settings: Settings) -> anyhow::Result<Self> {
        let email_client = email_client::from_settings(&settings.email)
            .context("Failed to create the email client")?;
        let owner = Owner {
            address: settings.email.owner().map_err(anyhow::Error::msg)?,
            name: settings.email.owner_name.clone(),
        };

        let app_state = AppState::new(
            NotificationDispatcher::new(email_client, owner),
            RateLimiter::new(
                settings.rate_limit.max_requests,
                settings.rate_limit.window(),
            ),
            Metrics::new()?,
        );
        let router = Self::build_router(app_state, &settings.application.allowed_origin)?;

        let listener = TcpListener::bind(settings.application.address())
            .with_context(|| format!("Failed to bind {}", settings.application.address()))?;

        Ok(Self { listener, router })
    }

    /// The port the application is listening on.
    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    /// Serve the app until it receives a shutdown signal.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Server running at {}", self.listener.local_addr()?);

        Server::from_tcp(self.listener)?
            .serve(
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Build the router for the application.
    fn build_router(app_state: AppState, allowed_origin: &str) -> anyhow::Result<Router> {
        use tower_http::{
            catch_panic::CatchPanicLayer,
            cors::{AllowOrigin, CorsLayer},
            request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
            set_header::SetResponseHeaderLayer,
            trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
        };
        use tracing::Level;

        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list([allowed_origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid allowed origin `{allowed_origin}`"))?]))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true);

        let router = SECURITY_HEADERS
            .into_iter()
            .fold(routes::build_router(app_state), |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::if_not_present(
                    name,
                    HeaderValue::from_static(value),
                ))
            })
            .layer(cors)
            .layer(CatchPanicLayer::custom(routes::handle_panic))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        Ok(router)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
