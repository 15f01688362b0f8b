use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use serde_json::json;

use sqlx::PgPool;

use tracing_actix_web::TracingLogger;

use crate::controller::subscriptions;
use crate::telemetry;

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

/// Run the application on a specified TCP listener
pub fn run(listener: TcpListener, pool: PgPool) -> anyhow::Result<Server> {
    // Wrap application data
    let pool = web::Data::new(pool);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(telemetry::request_log))
            .wrap(TracingLogger::default())
            .app_data(pool.clone())
            .service(health_check)
            .service(subscriptions::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
