//! Reverse proxy to one backend service.

use std::time::Duration;

use barrest_app::clients::{
    GATEWAY_SERVICE_HEADER, GATEWAY_SERVICE_NAME, GATEWAY_SESSION_MANAGED_HEADER,
    REQUEST_ID_HEADER,
};
use reqwest::{Client, redirect::Policy};
use salvo::{
    conn::SocketAddr,
    http::{
        HeaderMap, HeaderName, uri::Uri,
        header::{CONTENT_LENGTH, HOST, HeaderValue},
    },
    prelude::*,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    errors::{ApiError, GATEWAY},
    extensions::*,
};

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Connection-scoped headers that must not cross the proxy.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Path fragments used to name the backend in failure envelopes, checked in order.
const SERVICES_BY_PATH: [(&str, &str); 7] = [
    ("/sessions", "session-service"),
    ("/data", "data-service"),
    ("/orders", "orders-service"),
    ("/menu", "menu-service"),
    ("/inventory", "inventory-service"),
    ("/stock", "inventory-service"),
    ("/invoices", "invoice-service"),
];

/// Name of the backend a request path belongs to, or `unknown-service`.
pub fn service_for_path(path: &str) -> &'static str {
    SERVICES_BY_PATH
        .iter()
        .find(|(fragment, _)| path.contains(fragment))
        .map_or("unknown-service", |&(_, service)| service)
}

/// Forwards the request path and query unchanged to one backend base URL.
///
/// Transport failures never reach the client: they become a `502` envelope naming the backend.
#[derive(Debug, Clone)]
pub struct Forwarder {
    http: Client,
    base_url: String,
    max_body_bytes: usize,
}

impl Forwarder {
    /// Proxy to `base_url`, bounding each exchange by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        max_body_bytes: usize,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder()
                .timeout(timeout)
                .redirect(Policy::none())
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_body_bytes,
        })
    }

    /// Backend base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn upstream_url(&self, uri: &Uri) -> String {
        let path_and_query = uri.path_and_query().map_or("/", |value| value.as_str());

        format!("{}{path_and_query}", self.base_url)
    }

    fn payload_too_large(&self) -> ApiError {
        ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            format!("Request body exceeds {} bytes", self.max_body_bytes),
            GATEWAY,
        )
    }
}

#[handler]
impl Forwarder {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response) {
        let path = req.uri().path().to_owned();

        if declared_length(req.headers()).is_some_and(|length| length > self.max_body_bytes) {
            res.render(self.payload_too_large());

            return;
        }

        let body = match req.payload_with_max_size(self.max_body_bytes).await {
            Ok(body) => body.clone(),
            Err(source) => {
                warn!(%path, "could not read request body: {source}");

                res.render(self.payload_too_large());

                return;
            }
        };

        let request_id = depot
            .request_id()
            .map(str::to_owned)
            .or_else(|| req.header::<String>(REQUEST_ID_HEADER))
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let mut upstream = self
            .http
            .request(req.method().clone(), self.upstream_url(req.uri()))
            .headers(outbound_headers(req.headers(), req.remote_addr(), &request_id));

        if !body.is_empty() {
            upstream = upstream.body(body);
        }

        let response = match upstream.send().await {
            Ok(response) => response,
            Err(source) => {
                render_unavailable(res, &path, &source);

                return;
            }
        };

        let status = response.status();
        let headers = relayable_headers(response.headers());

        match response.bytes().await {
            Ok(bytes) => {
                res.status_code(status);
                res.headers_mut().extend(headers);
                res.body(bytes);
            }
            Err(source) => render_unavailable(res, &path, &source),
        }
    }
}

fn render_unavailable(res: &mut Response, path: &str, source: &reqwest::Error) {
    let service = service_for_path(path);

    error!(service, path, "proxy error - service unavailable: {source}");

    res.render(
        ApiError::new(
            StatusCode::BAD_GATEWAY,
            "service_unavailable",
            format!("The {service} is currently unavailable"),
            service,
        )
        .with_path(path),
    );
}

fn is_forwardable(name: &HeaderName) -> bool {
    !HOP_BY_HOP.contains(&name.as_str()) && *name != HOST && *name != CONTENT_LENGTH
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn client_ip(remote: &SocketAddr) -> Option<String> {
    remote
        .as_ipv4()
        .map(|address| address.ip().to_string())
        .or_else(|| remote.as_ipv6().map(|address| address.ip().to_string()))
}

fn outbound_headers(inbound: &HeaderMap, remote: &SocketAddr, request_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 4);

    for (name, value) in inbound {
        if is_forwardable(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }

    if let Some(ip) = client_ip(remote) {
        let forwarded_for = match headers
            .get(FORWARDED_FOR_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            Some(chain) => format!("{chain}, {ip}"),
            None => ip,
        };

        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(FORWARDED_FOR_HEADER, value);
        }
    }

    headers.insert(
        GATEWAY_SERVICE_HEADER,
        HeaderValue::from_static(GATEWAY_SERVICE_NAME),
    );
    headers.insert(
        GATEWAY_SESSION_MANAGED_HEADER,
        HeaderValue::from_static("true"),
    );

    headers
}

fn relayable_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream {
        if is_forwardable(name) && name != REQUEST_ID_HEADER {
            headers.append(name.clone(), value.clone());
        }
    }

    headers
}
