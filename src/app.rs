use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use sqlx::PgPool;

use tracing_actix_web::TracingLogger;

use crate::client::StorageClient;
use crate::controller::{self, notifications, offers, reservations};
use crate::crypto::SigningKey;

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("I am alive")
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    pool: PgPool,
    signing_key: SigningKey,
    storage_client: StorageClient,
    max_upload_bytes: usize,
) -> anyhow::Result<Server> {
    // Wrap application data
    let pool = web::Data::new(pool);
    let signing_key = web::Data::new(signing_key);
    let storage_client = web::Data::new(storage_client);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(pool.clone())
            .app_data(signing_key.clone())
            .app_data(storage_client.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(controller::json_config())
            .app_data(controller::query_config())
            .app_data(controller::path_config())
            .service(health_check)
            .service(offers::scope())
            .service(reservations::scope())
            .service(notifications::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
