//! Barrest API gateway

use std::{process, sync::Arc};

use salvo::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use barrest_app::clients::HttpSessionClient;
use barrest_json::{
    config::{self, GatewayConfig},
    gateway::{self, GatewayState, Upstreams},
    observability, shutdown,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
pub async fn main() {
    let config: GatewayConfig = config::load().unwrap_or_else(|error| {
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

    let validator = match HttpSessionClient::new(
        &config.upstreams.session_service_url,
        config.upstreams.session_validation_timeout(),
    ) {
        Ok(client) => client,
        Err(client_error) => {
            error!("failed to build session client: {client_error}");

            process::exit(1);
        }
    };

    let upstreams = match Upstreams::from_config(&config.upstreams) {
        Ok(upstreams) => upstreams,
        Err(client_error) => {
            error!("failed to build upstream clients: {client_error}");

            process::exit(1);
        }
    };

    let monitor = match gateway::monitor(&config) {
        Ok(monitor) => Arc::new(monitor),
        Err(probe_error) => {
            error!("failed to build health probes: {probe_error}");

            process::exit(1);
        }
    };

    let state = Arc::new(GatewayState::new(Arc::new(validator)));
    let router = gateway::router(state, &upstreams, Arc::clone(&monitor));

    let service = match gateway::service(router, &config.cors_allowed_origin) {
        Ok(service) => service,
        Err(cors_error) => {
            error!(
                origin = %config.cors_allowed_origin,
                "invalid CORS allowed origin: {cors_error}"
            );

            process::exit(1);
        }
    };

    let background = CancellationToken::new();
    let monitor_task = monitor.start(background.clone());

    let addr = config.server.socket_addr();

    info!("Starting gateway on {addr}");

    let listener = TcpListener::new(addr).bind().await;
    let server = Server::new(listener);
    let handle = server.handle();

    let shutdown_token = background.clone();
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, shutdown_token).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(service).await;

    background.cancel();

    if let Err(join_error) = monitor_task.await {
        error!("health monitor task failed: {join_error}");
    }

    info!("Gateway stopped");
}
