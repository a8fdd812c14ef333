//! Session Service Config

use clap::Args;
use jiff::SignedDuration;

/// Application database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}

/// Token signing settings.
#[derive(Debug, Args)]
pub struct TokenConfig {
    /// Shared HMAC secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token lifetime, e.g. `24h` or `90m`
    #[arg(long, env = "JWT_EXPIRATION", default_value = "24h")]
    pub jwt_expiration: SignedDuration,

    /// `iss` claim written and required on tokens
    #[arg(long, env = "JWT_ISSUER", default_value = barrest::tokens::DEFAULT_ISSUER)]
    pub jwt_issuer: String,
}
