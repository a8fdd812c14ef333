//! App Context

use std::{sync::Arc, time::Duration};

use barrest::tokens::TokenCodec;
use sqlx::PgPool;
use thiserror::Error;

use crate::{
    database,
    probes::DatabaseProbe,
    sessions::{PgSessionsService, SessionsService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub sessions: Arc<dyn SessionsService>,
    pool: PgPool,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, codec: TokenCodec) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_pool(pool, codec))
    }

    #[must_use]
    pub fn from_pool(pool: PgPool, codec: TokenCodec) -> Self {
        Self {
            sessions: Arc::new(PgSessionsService::new(pool.clone(), codec)),
            pool,
        }
    }

    /// Liveness probe for this context's database.
    #[must_use]
    pub fn database_probe(&self, timeout: Duration) -> DatabaseProbe {
        DatabaseProbe::new(self.pool.clone(), timeout)
    }
}
