//! Gateway Upstream Config

use std::time::Duration;

use clap::Args;

/// Backend services and proxy limits.
#[derive(Debug, Args)]
pub struct UpstreamConfig {
    /// Session service base URL
    #[arg(long, env = "SESSION_SERVICE_URL")]
    pub session_service_url: String,

    /// Data service base URL
    #[arg(long, env = "DATA_SERVICE_URL")]
    pub data_service_url: String,

    /// Menu service base URL; `/api/v1/menu` is mounted only when set
    #[arg(long, env = "MENU_SERVICE_URL")]
    pub menu_service_url: Option<String>,

    /// Inventory service base URL; `/api/v1/inventory` and `/api/v1/stock` are mounted only when set
    #[arg(long, env = "INVENTORY_SERVICE_URL")]
    pub inventory_service_url: Option<String>,

    /// Invoice service base URL; `/api/v1/invoices` is mounted only when set
    #[arg(long, env = "INVOICE_SERVICE_URL")]
    pub invoice_service_url: Option<String>,

    /// Orders service base URL; `/api/v1/orders` is mounted only when set
    #[arg(long, env = "ORDERS_SERVICE_URL")]
    pub orders_service_url: Option<String>,

    /// Timeout of a session validation call
    #[arg(long, env = "SESSION_VALIDATION_TIMEOUT_MS", default_value_t = 10_000_u64)]
    pub session_validation_timeout_ms: u64,

    /// Timeout of a proxied request, including the response body
    #[arg(long, env = "FORWARD_TIMEOUT_MS", default_value_t = 15_000_u64)]
    pub forward_timeout_ms: u64,

    /// Largest request body the gateway will proxy
    #[arg(long, env = "FORWARD_MAX_BODY_BYTES", default_value_t = 1_048_576_usize)]
    pub forward_max_body_bytes: usize,
}

impl UpstreamConfig {
    /// Timeout of a session validation call.
    #[must_use]
    pub fn session_validation_timeout(&self) -> Duration {
        Duration::from_millis(self.session_validation_timeout_ms)
    }

    /// Timeout of a proxied request.
    #[must_use]
    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.forward_timeout_ms)
    }
}
