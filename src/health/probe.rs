use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;

/// Reasons a dependency check failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The dependency answered with something other than success.
    #[error("dependency answered with status {0}")]
    UnexpectedStatus(u16),

    /// The check did not finish within its deadline.
    #[error("health check timed out")]
    TimedOut,

    /// The dependency could not be reached.
    #[error("health check failed")]
    Unreachable(#[source] Box<dyn Error + Send + Sync>),
}

/// A side-effect-free liveness check for one dependency.
#[async_trait]
pub trait Probe: Send + Sync {
    /// What the probe points at: a URL, or `self` for the service's own database.
    fn target(&self) -> &str;

    /// Run one check.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when the dependency is not healthy.
    async fn check(&self) -> Result<(), ProbeError>;
}
