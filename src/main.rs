use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use socialnet_server::auth::handlers::configure;
use socialnet_server::middleware::{log_request, RequestTimeout};
use socialnet_server::{AppState, Settings};
use std::net::TcpListener;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Settings::new().context("failed to load configuration")?;
    info!("Configuration loaded successfully");

    let (state, gateway) = AppState::new(config.clone())
        .await
        .context("failed to initialize the database")?;
    let state = web::Data::new(state);

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))
        .context("failed to bind listener")?;
    info!("listening at {}:{}", config.server.host, config.server.port);

    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(log_request))
            .app_data(RequestTimeout(request_timeout))
            .app_data(state.clone())
            .configure(configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .client_request_timeout(request_timeout)
    .client_disconnect_timeout(request_timeout)
    .run()
    .await
    .context("server error")?;

    info!("server closed");
    gateway.close().await;

    Ok(())
}
