use std::net::TcpListener;

use anyhow::Context;

use sqlx::PgPool;

use misky::app;
use misky::client::StorageClient;
use misky::crypto::SigningKey;
use misky::settings::Settings;
use misky::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info", std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load()?;

    let pool = PgPool::connect_with(settings.database.with_db())
        .await
        .context("Failed to connect to the database")?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let signing_key = SigningKey::new(settings.app.secret_key())?;
    let storage_client = StorageClient::new(
        settings.storage.api_base_url()?,
        settings.storage.bucket().to_string(),
        settings.storage.api_timeout(),
        settings.storage.api_auth_token(),
    )?;

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    app::run(
        listener,
        pool,
        signing_key,
        storage_client,
        settings.storage.max_upload_bytes(),
    )?
    .await
    .context("Failed to run app")
}
