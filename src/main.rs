mod classify;
mod config;
mod error;
mod handlers;
mod models;
mod preprocess;
mod state;
mod upstream;

use actix_cors::Cors;
use actix_web::{
    middleware::{Condition, Logger},
    web, App, HttpServer,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::RelayConfig;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beef_relay=info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::parse();
    let state = AppState::new(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(state);

    info!("Inference service: {}", config.inference_url);
    info!("Classification API: {}", config.downstream_url);
    info!("CORS enabled: {}", config.enable_cors);

    let enable_cors = config.enable_cors;
    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(Condition::new(enable_cors, cors))
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::routes)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    let (host, port) = config.bind_addr();
    info!("Server running at http://{}:{}", host, port);

    server.bind((host, port))?.run().await
}
