//! Server configuration for the session service and the gateway.

use std::time::Duration;

use clap::Parser;

pub mod gateway;
pub mod observability;
pub mod server;
pub mod session;

pub use gateway::UpstreamConfig;
pub use observability::{LogFormat, LoggingConfig};
pub use server::ServerRuntimeConfig;
pub use session::{DatabaseConfig, TokenConfig};

/// Session service configuration.
#[derive(Debug, Parser)]
#[command(name = "session-service", about = "Barrest session service", long_about = None)]
pub struct SessionServiceConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Token signing settings.
    #[command(flatten)]
    pub token: TokenConfig,

    /// Data service base URL, tracked as a health dependency when set
    #[arg(long, env = "DATA_SERVICE_URL")]
    pub data_service_url: Option<String>,

    /// Delay between dependency checks
    #[arg(long, env = "HEALTH_CHECK_INTERVAL_MS", default_value_t = 1_000_u64)]
    pub health_check_interval_ms: u64,

    /// Timeout of a single dependency check
    #[arg(long, env = "HEALTH_PROBE_TIMEOUT_MS", default_value_t = 1_000_u64)]
    pub health_probe_timeout_ms: u64,
}

impl SessionServiceConfig {
    /// Delay between dependency checks.
    #[must_use]
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    /// Timeout of a single dependency check.
    #[must_use]
    pub fn health_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.health_probe_timeout_ms)
    }
}

/// Gateway configuration.
#[derive(Debug, Parser)]
#[command(name = "gateway", about = "Barrest API gateway", long_about = None)]
pub struct GatewayConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Backend services and proxy limits.
    #[command(flatten)]
    pub upstreams: UpstreamConfig,

    /// Value of `Access-Control-Allow-Origin`
    #[arg(long, env = "CORS_ALLOWED_ORIGIN", default_value = "*")]
    pub cors_allowed_origin: String,

    /// Delay between dependency checks
    #[arg(long, env = "HEALTH_CHECK_INTERVAL_MS", default_value_t = 10_000_u64)]
    pub health_check_interval_ms: u64,

    /// Timeout of a single dependency check
    #[arg(long, env = "HEALTH_PROBE_TIMEOUT_MS", default_value_t = 1_000_u64)]
    pub health_probe_timeout_ms: u64,
}

impl GatewayConfig {
    /// Delay between dependency checks.
    #[must_use]
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    /// Timeout of a single dependency check.
    #[must_use]
    pub fn health_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.health_probe_timeout_ms)
    }
}

/// Load configuration from `.env`, the environment and CLI arguments.
///
/// # Errors
///
/// Returns an error if configuration cannot be parsed
pub fn load<C: Parser>() -> Result<C, clap::Error> {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    C::try_parse()
}
