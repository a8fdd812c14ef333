use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use jiff::Timestamp;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::health::{HealthStatus, Probe, ProbeError, ServiceHealth};

struct Dependency {
    probe: Arc<dyn Probe>,
    health: ServiceHealth,
}

/// Background poller caching the health of named dependencies.
///
/// Construct once per process, register dependencies, then [`start`](Self::start) it. Readers
/// never wait on a probe: they only take the read lock or load the aggregate flag.
pub struct HealthMonitor {
    interval: Duration,
    dependencies: RwLock<BTreeMap<String, Dependency>>,
    healthy: AtomicBool,
}

impl HealthMonitor {
    /// Create a monitor that re-checks every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            dependencies: RwLock::new(BTreeMap::new()),
            healthy: AtomicBool::new(false),
        }
    }

    /// Register a dependency and return the monitor.
    #[must_use]
    pub fn with_dependency(self, name: impl Into<String>, probe: Arc<dyn Probe>) -> Self {
        self.add_dependency(name, probe);
        self
    }

    /// Register a dependency. It starts out unhealthy until its first successful check.
    pub fn add_dependency(&self, name: impl Into<String>, probe: Arc<dyn Probe>) {
        let name = name.into();

        let health = ServiceHealth {
            name: name.clone(),
            target: probe.target().to_string(),
            healthy: false,
            last_check: None,
        };

        let mut dependencies = self.write();
        dependencies.insert(name, Dependency { probe, health });
        self.refresh_aggregate(&dependencies);
    }

    /// Polling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the polling task. It checks immediately, then every interval, until `cancel` fires.
    pub fn start(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let monitor = Arc::clone(self);

        tokio::spawn(async move { monitor.run(cancel).await })
    }

    /// Poll until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("health monitor stopped");
                    break;
                }
                _ = ticker.tick() => self.check_all().await,
            }
        }
    }

    /// Check every registered dependency once and record the results.
    pub async fn check_all(&self) {
        let probes: Vec<(String, Arc<dyn Probe>)> = self
            .read()
            .iter()
            .map(|(name, dependency)| (name.clone(), Arc::clone(&dependency.probe)))
            .collect();

        for (name, probe) in probes {
            let result = probe.check().await;

            self.record(&name, result);
        }
    }

    fn record(&self, name: &str, result: Result<(), ProbeError>) {
        let now = Timestamp::now();

        let (previous, target) = {
            let mut dependencies = self.write();

            let Some(dependency) = dependencies.get_mut(name) else {
                return;
            };

            let previous = dependency.health.last_check.map(|_| dependency.health.healthy);

            dependency.health.healthy = result.is_ok();
            dependency.health.last_check = Some(now);

            let target = dependency.health.target.clone();

            self.refresh_aggregate(&dependencies);

            (previous, target)
        };

        match (result, previous) {
            (Ok(()), Some(false) | None) => {
                info!(dependency = name, probe_target = %target, "dependency is healthy");
            }
            (Err(error), Some(true) | None) => {
                warn!(dependency = name, probe_target = %target, %error, "dependency is unhealthy");
            }
            _ => {}
        }
    }

    /// Snapshot of every dependency.
    pub fn status(&self) -> HealthStatus {
        HealthStatus::from_services(
            self.read()
                .iter()
                .map(|(name, dependency)| (name.clone(), dependency.health.healthy))
                .collect(),
        )
    }

    /// True when at least one dependency is registered and all are healthy.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    /// Cached health of `name`; unknown dependencies are unhealthy.
    pub fn is_service_healthy(&self, name: &str) -> bool {
        self.read()
            .get(name)
            .is_some_and(|dependency| dependency.health.healthy)
    }

    /// Copy of the entry for `name`.
    pub fn service_status(&self, name: &str) -> Option<ServiceHealth> {
        self.read()
            .get(name)
            .map(|dependency| dependency.health.clone())
    }

    /// Copies of every entry, ordered by name.
    pub fn services(&self) -> Vec<ServiceHealth> {
        self.read()
            .values()
            .map(|dependency| dependency.health.clone())
            .collect()
    }

    fn refresh_aggregate(&self, dependencies: &BTreeMap<String, Dependency>) {
        let healthy = !dependencies.is_empty()
            && dependencies
                .values()
                .all(|dependency| dependency.health.healthy);

        self.healthy.store(healthy, Ordering::Release);
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Dependency>> {
        self.dependencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Dependency>> {
        self.dependencies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("interval", &self.interval)
            .field("services", &self.services())
            .finish()
    }
}
