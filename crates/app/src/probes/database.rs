use std::time::Duration;

use async_trait::async_trait;
use barrest::health::{Probe, ProbeError};
use sqlx::{PgPool, query_scalar};
use tokio::time::timeout;

/// Target reported for the service's own database.
pub const DATABASE_TARGET: &str = "self";

const PING_SQL: &str = "SELECT 1";

/// Healthy iff `SELECT 1` answers within the timeout.
#[derive(Debug, Clone)]
pub struct DatabaseProbe {
    pool: PgPool,
    timeout: Duration,
}

impl DatabaseProbe {
    #[must_use]
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    fn target(&self) -> &str {
        DATABASE_TARGET
    }

    async fn check(&self) -> Result<(), ProbeError> {
        match timeout(self.timeout, query_scalar::<_, i32>(PING_SQL).fetch_one(&self.pool)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(error)) => Err(ProbeError::Unreachable(Box::new(error))),
            Err(_elapsed) => Err(ProbeError::TimedOut),
        }
    }
}
