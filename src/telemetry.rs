use anyhow::Context;
use tracing::{subscriber::set_global_default, Level, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{filter::Targets, fmt::MakeWriter, layer::SubscriberExt, Registry};

/// Log levels used unless `RUST_LOG` holds a valid list of targets,
/// e.g. `portfolio_contact=trace,lettre=debug,warn`.
fn default_targets() -> Targets {
    Targets::new()
        .with_target("portfolio_contact", Level::DEBUG)
        .with_target("tower_http::trace", Level::INFO)
        .with_target("hyper", Level::INFO)
        .with_target("lettre", Level::INFO)
        .with_default(Level::WARN)
}

fn targets(directives: Option<&str>) -> Targets {
    directives
        .and_then(|directives| directives.parse().ok())
        .unwrap_or_else(default_targets)
}

/// Create a new subscriber writing bunyan-formatted JSON logs to `sink`.
pub fn get_subscriber<Sink>(name: String, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = targets(std::env::var("RUST_LOG").ok().as_deref());
    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Init a subscriber and set it as the global tracing subscription.
/// Records from the `log` facade are forwarded to it as well.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    LogTracer::init().context("Failed to set logger")?;
    set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}
