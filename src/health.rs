//! Dependency health monitoring
//!
//! A [`HealthMonitor`] owns a set of named dependencies, each checked by a [`Probe`]. A single
//! background task re-checks every dependency on a fixed interval and caches the result, so health
//! endpoints only ever read the cache.

mod monitor;
mod probe;
mod status;

pub use monitor::HealthMonitor;
pub use probe::{Probe, ProbeError};
pub use status::{HealthStatus, ServiceHealth};
