use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Cached health of one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Dependency name, e.g. `data-service`.
    pub name: String,

    /// Probe target.
    pub target: String,

    /// Result of the most recent check. Unhealthy until the first successful check.
    pub healthy: bool,

    /// When the most recent check finished.
    pub last_check: Option<Timestamp>,
}

/// Snapshot of every tracked dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// True when at least one dependency is tracked and all of them are healthy.
    pub is_healthy: bool,

    /// Health per dependency name.
    pub services: BTreeMap<String, bool>,
}

impl HealthStatus {
    /// Aggregate per-dependency flags.
    pub fn from_services(services: BTreeMap<String, bool>) -> Self {
        Self {
            is_healthy: !services.is_empty() && services.values().all(|healthy| *healthy),
            services,
        }
    }
}
