//! Outbound service clients.

mod sessions;

pub use sessions::*;

/// Header naming the gateway on requests it originates or forwards.
pub const GATEWAY_SERVICE_HEADER: &str = "x-gateway-service";

/// Header telling backends that the gateway already validated the session.
pub const GATEWAY_SESSION_MANAGED_HEADER: &str = "x-gateway-session-managed";

/// Value of [`GATEWAY_SERVICE_HEADER`].
pub const GATEWAY_SERVICE_NAME: &str = "barrest-gateway";

/// Correlation id header.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
