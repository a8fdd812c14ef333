//! API gateway: authenticates protected routes against the session service and proxies every
//! route to its backend.

use std::{fmt, sync::Arc};

use barrest::health::HealthMonitor;
use barrest_app::clients::SessionValidator;
use salvo::{affix_state::inject, prelude::*, trailing_slash::remove_slash};

use crate::{
    config::{GatewayConfig, UpstreamConfig},
    healthcheck::{HealthEndpoint, service_probe},
    observability,
};

mod auth;
mod cors;
mod forwarder;
mod identity;

pub use auth::RENEWED_TOKEN_HEADER;
pub use cors::cors;
pub use forwarder::{Forwarder, service_for_path};

/// Service name on the gateway's own health report.
pub const GATEWAY_HEALTH_SERVICE: &str = "gateway-service";

/// Gateway state injected into every request.
#[derive(Clone)]
pub struct GatewayState {
    pub(crate) validator: Arc<dyn SessionValidator>,
}

impl fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayState").finish_non_exhaustive()
    }
}

impl GatewayState {
    /// State validating bearer tokens through `validator`.
    #[must_use]
    pub fn new(validator: Arc<dyn SessionValidator>) -> Self {
        Self { validator }
    }
}

/// One forwarder per backend. Optional backends are mounted only when configured.
#[derive(Debug, Clone)]
pub struct Upstreams {
    /// Session service, also serving public login and validation.
    pub sessions: Forwarder,

    /// Data service.
    pub data: Forwarder,

    /// Menu service.
    pub menu: Option<Forwarder>,

    /// Inventory service, mounted under `inventory` and `stock`.
    pub inventory: Option<Forwarder>,

    /// Invoice service.
    pub invoices: Option<Forwarder>,

    /// Orders service.
    pub orders: Option<Forwarder>,
}

impl Upstreams {
    /// Build forwarders for every configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error when an HTTP client cannot be constructed.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.forward_timeout();
        let limit = config.forward_max_body_bytes;

        let optional = |url: Option<&str>| {
            url.map(|url| Forwarder::new(url, timeout, limit))
                .transpose()
        };

        Ok(Self {
            sessions: Forwarder::new(&config.session_service_url, timeout, limit)?,
            data: Forwarder::new(&config.data_service_url, timeout, limit)?,
            menu: optional(config.menu_service_url.as_deref())?,
            inventory: optional(config.inventory_service_url.as_deref())?,
            invoices: optional(config.invoice_service_url.as_deref())?,
            orders: optional(config.orders_service_url.as_deref())?,
        })
    }

    /// `(path prefix, forwarder, has health route)` for each configured optional backend.
    fn optional(&self) -> Vec<(&'static str, &Forwarder, bool)> {
        [
            ("menu", self.menu.as_ref(), true),
            ("inventory", self.inventory.as_ref(), true),
            ("stock", self.inventory.as_ref(), false),
            ("invoices", self.invoices.as_ref(), true),
            ("orders", self.orders.as_ref(), true),
        ]
        .into_iter()
        .filter_map(|(prefix, forwarder, health)| {
            forwarder.map(|forwarder| (prefix, forwarder, health))
        })
        .collect()
    }
}

/// Health monitor over every configured backend's `/p/health` endpoint.
///
/// # Errors
///
/// Returns an error when a probe's HTTP client cannot be constructed.
pub fn monitor(config: &GatewayConfig) -> Result<HealthMonitor, reqwest::Error> {
    let timeout = config.health_probe_timeout();
    let upstreams = &config.upstreams;

    let dependencies = [
        ("session-service", Some(&upstreams.session_service_url), "sessions"),
        ("data-service", Some(&upstreams.data_service_url), "data"),
        ("menu-service", upstreams.menu_service_url.as_ref(), "menu"),
        ("inventory-service", upstreams.inventory_service_url.as_ref(), "inventory"),
        ("invoice-service", upstreams.invoice_service_url.as_ref(), "invoices"),
        ("orders-service", upstreams.orders_service_url.as_ref(), "orders"),
    ];

    let monitor = HealthMonitor::new(config.health_check_interval());

    for (name, base_url, prefix) in dependencies {
        let Some(base_url) = base_url else {
            continue;
        };

        monitor.add_dependency(name, Arc::new(service_probe(base_url, prefix, timeout)?));
    }

    Ok(monitor)
}

/// Gateway route table.
pub fn router(
    state: Arc<GatewayState>,
    upstreams: &Upstreams,
    monitor: Arc<HealthMonitor>,
) -> Router {
    let mut public = Router::new()
        .push(
            Router::with_path("api/v1/gateway/p/health")
                .get(HealthEndpoint::new(GATEWAY_HEALTH_SERVICE, monitor)),
        )
        .push(Router::with_path("api/v1/sessions/p/login").post(upstreams.sessions.clone()))
        .push(Router::with_path("api/v1/sessions/p/validate").post(upstreams.sessions.clone()))
        .push(Router::with_path("api/v1/sessions/p/health").get(upstreams.sessions.clone()))
        .push(Router::with_path("api/v1/data/p/health").get(upstreams.data.clone()));

    let mut protected = Router::new()
        .hoop(auth::authenticate)
        .push(Router::with_path("api/v1/sessions/logout").post(upstreams.sessions.clone()))
        .push(Router::with_path("api/v1/data/{**rest}").goal(upstreams.data.clone()));

    for (prefix, forwarder, health) in upstreams.optional() {
        if health {
            public = public.push(
                Router::with_path(format!("api/v1/{prefix}/p/health")).get(forwarder.clone()),
            );
        }

        protected = protected
            .push(Router::with_path(format!("api/v1/{prefix}/{{**rest}}")).goal(forwarder.clone()));
    }

    Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(remove_slash())
        .hoop(identity::strip_identity_headers)
        .hoop(inject(state))
        .push(public)
        .push(protected)
}

/// Wrap the route table with the CORS policy.
///
/// # Errors
///
/// Returns an error when `allowed_origin` is not a valid header value.
pub fn service(
    router: Router,
    allowed_origin: &str,
) -> Result<Service, salvo::http::header::InvalidHeaderValue> {
    Ok(Service::new(router).hoop(cors(allowed_origin)?))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use barrest_app::{
        clients::MockSessionValidator,
        sessions::data::ValidationResponse,
        testing::{StubServer, unused_address},
    };
    use salvo::{
        http::header::AUTHORIZATION,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use crate::errors::ErrorBody;

    use super::*;

    fn forwarder(base_url: &str) -> TestResult<Forwarder> {
        Ok(Forwarder::new(base_url, Duration::from_secs(2), 1024)?)
    }

    async fn dead_upstreams() -> TestResult<Upstreams> {
        let dead = format!("http://{}", unused_address().await?);

        Ok(Upstreams {
            sessions: forwarder(&dead)?,
            data: forwarder(&dead)?,
            menu: None,
            inventory: Some(forwarder(&dead)?),
            invoices: None,
            orders: None,
        })
    }

    fn make_service(validator: MockSessionValidator, upstreams: &Upstreams) -> TestResult<Service> {
        let state = Arc::new(GatewayState::new(Arc::new(validator)));
        let monitor = Arc::new(HealthMonitor::new(Duration::from_secs(60)));

        Ok(service(router(state, upstreams, monitor), "*")?)
    }

    #[test]
    fn state_debug_names_the_type() {
        let state = GatewayState::new(Arc::new(MockSessionValidator::new()));

        assert_eq!(format!("{state:?}"), "GatewayState { .. }");
    }

    #[tokio::test]
    async fn protected_route_without_token_is_401() -> TestResult {
        let mut validator = MockSessionValidator::new();

        validator.expect_validate().never();

        let service = make_service(validator, &dead_upstreams().await?)?;

        for path in [
            "/api/v1/data/tables",
            "/api/v1/data",
            "/api/v1/inventory/items",
            "/api/v1/stock/levels",
        ] {
            let mut res = TestClient::get(format!("http://example.com{path}"))
                .send(&service)
                .await;

            let body: ErrorBody = res.take_json().await?;

            assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED), "{path}");
            assert_eq!(body.error, "missing_token", "{path}");
        }

        Ok(())
    }

    #[tokio::test]
    async fn public_login_is_forwarded_without_auth() -> TestResult {
        let mut validator = MockSessionValidator::new();

        validator.expect_validate().never();

        let backend = StubServer::respond(201, r#"{"session_id":"s-1"}"#).await?;
        let upstreams = Upstreams {
            sessions: forwarder(&backend.base_url())?,
            ..dead_upstreams().await?
        };

        let mut res = TestClient::post("http://example.com/api/v1/sessions/p/login")
            .add_header("x-user-role", "owner", true)
            .raw_json(r#"{"username":"alice","password":"s3cret"}"#)
            .send(&make_service(validator, &upstreams)?)
            .await;

        let body = res.take_string().await?;
        let received = backend.received().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body, r#"{"session_id":"s-1"}"#);
        assert!(
            received.starts_with("post /api/v1/sessions/p/login "),
            "{received}"
        );
        assert!(!received.contains("x-user-role"), "forged header stripped");

        Ok(())
    }

    #[tokio::test]
    async fn authenticated_request_reaches_backend_with_identity() -> TestResult {
        let mut validator = MockSessionValidator::new();

        validator.expect_validate().once().return_once(|_, _| {
            Ok(ValidationResponse {
                valid: true,
                session_id: Some("s-1".to_string()),
                staff_id: Some("staff-1".to_string()),
                username: Some("alice".to_string()),
                role: Some("bartender".to_string()),
                ..ValidationResponse::default()
            })
        });

        let backend = StubServer::respond(200, r#"{"tables":[]}"#).await?;
        let upstreams = Upstreams {
            data: forwarder(&backend.base_url())?,
            ..dead_upstreams().await?
        };

        let res = TestClient::get("http://example.com/api/v1/data/tables")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .add_header("x-user-role", "owner", true)
            .send(&make_service(validator, &upstreams)?)
            .await;

        let received = backend.received().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(received.contains("x-user-id: staff-1"), "{received}");
        assert!(received.contains("x-username: alice"), "{received}");
        assert!(received.contains("x-user-role: bartender"), "{received}");
        assert!(!received.contains("owner"), "client role never forwarded");
        assert!(received.contains("authorization: bearer abc123"), "{received}");

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_session_service_is_502() -> TestResult {
        let mut validator = MockSessionValidator::new();

        validator.expect_validate().never();

        let mut res = TestClient::post("http://example.com/api/v1/sessions/p/validate")
            .raw_json(r#"{"token":"abc"}"#)
            .send(&make_service(validator, &dead_upstreams().await?)?)
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));
        assert_eq!(body.service, "session-service");
        assert_eq!(body.path.as_deref(), Some("/api/v1/sessions/p/validate"));

        Ok(())
    }

    #[tokio::test]
    async fn unconfigured_service_is_not_routed() -> TestResult {
        let mut validator = MockSessionValidator::new();

        validator.expect_validate().never();

        let res = TestClient::get("http://example.com/api/v1/menu/items")
            .add_header(AUTHORIZATION, "Bearer abc123", true)
            .send(&make_service(validator, &dead_upstreams().await?)?)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn gateway_health_reports_cached_view() -> TestResult {
        let mut validator = MockSessionValidator::new();

        validator.expect_validate().never();

        let res = TestClient::get("http://example.com/api/v1/gateway/p/health")
            .send(&make_service(validator, &dead_upstreams().await?)?)
            .await;

        assert_eq!(
            res.status_code,
            Some(StatusCode::SERVICE_UNAVAILABLE),
            "no dependency has been checked yet"
        );

        Ok(())
    }

    #[tokio::test]
    async fn preflight_is_answered_with_cors_headers() -> TestResult {
        let mut validator = MockSessionValidator::new();

        validator.expect_validate().never();

        let res = TestClient::options("http://example.com/api/v1/data/tables")
            .add_header("origin", "https://pos.example.com", true)
            .add_header("access-control-request-method", "POST", true)
            .add_header("access-control-request-headers", "authorization", true)
            .send(&make_service(validator, &dead_upstreams().await?)?)
            .await;

        let allow_origin = res
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok());

        assert_eq!(allow_origin, Some("*"));
        assert!(
            res.headers().get("access-control-allow-credentials").is_none(),
            "credentials are not allowed with a wildcard origin"
        );

        Ok(())
    }

    #[test]
    fn monitor_tracks_configured_backends() -> TestResult {
        use clap::Parser as _;

        let config = GatewayConfig::try_parse_from([
            "gateway",
            "--port",
            "8080",
            "--session-service-url",
            "http://sessions:8081/",
            "--data-service-url",
            "http://data:8082",
            "--orders-service-url",
            "http://orders:8085",
        ])?;

        let monitor = monitor(&config)?;
        let targets: Vec<(String, String)> = monitor
            .services()
            .into_iter()
            .map(|service| (service.name, service.target))
            .collect();

        assert_eq!(
            targets,
            vec![
                (
                    "data-service".to_string(),
                    "http://data:8082/api/v1/data/p/health".to_string()
                ),
                (
                    "orders-service".to_string(),
                    "http://orders:8085/api/v1/orders/p/health".to_string()
                ),
                (
                    "session-service".to_string(),
                    "http://sessions:8081/api/v1/sessions/p/health".to_string()
                ),
            ]
        );

        Ok(())
    }
}
