//! Barrest session service

use std::{process, sync::Arc};

use salvo::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use barrest::{
    health::HealthMonitor,
    tokens::{SigningSecret, TokenCodec},
};
use barrest_app::context::AppContext;
use barrest_json::{
    config::{self, SessionServiceConfig},
    healthcheck::service_probe,
    observability, sessions, shutdown,
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
pub async fn main() {
    let config: SessionServiceConfig = config::load().unwrap_or_else(|error| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {error}");
        }

        process::exit(1);
    });

    if let Err(error) = observability::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {error}");
        }

        process::exit(1);
    }

    let codec = TokenCodec::new(
        &SigningSecret::from(config.token.jwt_secret.as_str()),
        config.token.jwt_issuer.as_str(),
        config.token.jwt_expiration,
    );

    let app = match AppContext::from_database_url(&config.database.database_url, codec).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let timeout = config.health_probe_timeout();
    let monitor = HealthMonitor::new(config.health_check_interval())
        .with_dependency("database", Arc::new(app.database_probe(timeout)));

    if let Some(data_service_url) = &config.data_service_url {
        match service_probe(data_service_url, "data", timeout) {
            Ok(probe) => monitor.add_dependency("data-service", Arc::new(probe)),
            Err(probe_error) => {
                error!("failed to build data service probe: {probe_error}");

                process::exit(1);
            }
        }
    }

    let monitor = Arc::new(monitor);
    let background = CancellationToken::new();
    let monitor_task = monitor.start(background.clone());

    let addr = config.server.socket_addr();

    info!("Starting session service on {addr}");

    let listener = TcpListener::new(addr).bind().await;
    let server = Server::new(listener);
    let handle = server.handle();

    let shutdown_token = background.clone();
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, shutdown_token).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    let router = sessions::router(State::from_app_context(app), Arc::clone(&monitor));

    server.serve(Service::new(router)).await;

    background.cancel();

    if let Err(join_error) = monitor_task.await {
        error!("health monitor task failed: {join_error}");
    }

    info!("Session service stopped");
}
