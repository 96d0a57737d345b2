use portfolio_contact::{configuration::get_configuration, telemetry, App};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    telemetry::init_subscriber(telemetry::get_subscriber(
        "portfolio-contact".to_string(),
        std::io::stdout,
    ))?;

    let configuration = get_configuration()?;
    let app = App::build(configuration)?;
    app.run_until_stopped().await?;

    Ok(())
}
