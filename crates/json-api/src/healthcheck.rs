//! Cached dependency health endpoint

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use barrest::health::HealthMonitor;
use barrest_app::probes::HttpProbe;
use jiff::Timestamp;
use salvo::prelude::*;
use serde::{Deserialize, Serialize};

/// Probe for a sibling service's `{base_url}/api/v1/{prefix}/p/health` endpoint.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be constructed.
pub fn service_probe(
    base_url: &str,
    prefix: &str,
    timeout: Duration,
) -> Result<HttpProbe, reqwest::Error> {
    HttpProbe::new(
        format!("{}/api/v1/{prefix}/p/health", base_url.trim_end_matches('/')),
        timeout,
    )
}

/// Health report body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Reporting service.
    pub service: String,

    /// When the report was rendered.
    pub timestamp: Timestamp,

    /// `healthy` or `unhealthy`
    pub status: String,
    pub message: String,

    /// Cached health per dependency.
    pub services: BTreeMap<String, bool>,
}

/// `GET …/p/health`: reports the monitor's cached view, `200` when every dependency is healthy
/// and `503` otherwise. Never probes inline.
#[derive(Debug, Clone)]
pub struct HealthEndpoint {
    service: &'static str,
    monitor: Arc<HealthMonitor>,
}

impl HealthEndpoint {
    /// Endpoint reporting `monitor` under the name `service`.
    pub fn new(service: &'static str, monitor: Arc<HealthMonitor>) -> Self {
        Self { service, monitor }
    }

    fn report(&self) -> (StatusCode, HealthResponse) {
        let status = self.monitor.status();

        let (code, label, message) = if status.is_healthy {
            (StatusCode::OK, "healthy", "All dependencies are healthy")
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "unhealthy",
                "One or more dependencies are unhealthy",
            )
        };

        (
            code,
            HealthResponse {
                service: self.service.to_string(),
                timestamp: Timestamp::now(),
                status: label.to_string(),
                message: message.to_string(),
                services: status.services,
            },
        )
    }
}

#[handler]
impl HealthEndpoint {
    async fn handle(&self, res: &mut Response) {
        let (code, body) = self.report();

        res.status_code(code);
        res.render(Json(body));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use barrest::health::{Probe, ProbeError};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use super::*;

    #[derive(Debug)]
    struct FixedProbe(bool);

    #[async_trait]
    impl Probe for FixedProbe {
        fn target(&self) -> &str {
            "fixed"
        }

        async fn check(&self) -> Result<(), ProbeError> {
            if self.0 {
                Ok(())
            } else {
                Err(ProbeError::TimedOut)
            }
        }
    }

    async fn service(dependencies: &[(&str, bool)]) -> Service {
        let monitor = dependencies.iter().fold(
            HealthMonitor::new(Duration::from_secs(60)),
            |monitor, (name, healthy)| {
                monitor.with_dependency(*name, Arc::new(FixedProbe(*healthy)))
            },
        );

        monitor.check_all().await;

        Service::new(
            Router::with_path("p/health")
                .get(HealthEndpoint::new("session-service", Arc::new(monitor))),
        )
    }

    #[tokio::test]
    async fn all_healthy_is_200() -> TestResult {
        let mut res = TestClient::get("http://example.com/p/health")
            .send(&service(&[("database", true), ("data-service", true)]).await)
            .await;

        let body: HealthResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.service, "session-service");
        assert_eq!(body.status, "healthy");
        assert_eq!(body.services.get("database"), Some(&true));

        Ok(())
    }

    #[tokio::test]
    async fn one_unhealthy_is_503_with_map() -> TestResult {
        let mut res = TestClient::get("http://example.com/p/health")
            .send(&service(&[("data-service", true), ("session-service", false)]).await)
            .await;

        let body: HealthResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(body.status, "unhealthy");
        assert_eq!(
            body.services,
            BTreeMap::from([
                ("data-service".to_string(), true),
                ("session-service".to_string(), false),
            ])
        );

        Ok(())
    }

    #[tokio::test]
    async fn no_dependencies_is_503() -> TestResult {
        let res = TestClient::get("http://example.com/p/health")
            .send(&service(&[]).await)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }
}
