use std::net::TcpListener;

use anyhow::Context;

use subscription_aggregator::app;
use subscription_aggregator::settings::Settings;
use subscription_aggregator::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;

    let subscriber = telemetry::create_subscriber(
        settings.log.filter.clone(),
        settings.log.format,
        std::io::stdout,
    );
    telemetry::set_subscriber(subscriber)?;

    let pool = settings
        .database
        .pool_options()
        .connect_with(settings.database.with_db())
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Successfully connected to database");

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!(addr = ?listener.local_addr()?, "Starting server");

    let result = app::run(listener, pool.clone())?
        .await
        .context("Failed to run app");

    pool.close().await;
    result
}
