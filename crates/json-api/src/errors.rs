//! Uniform JSON error envelope.

use jiff::Timestamp;
use salvo::{
    http::StatusCode,
    prelude::{Json, Response},
    writing::Scribe,
};
use serde::{Deserialize, Serialize};

/// Component name on envelopes produced by the session service.
pub const SESSION_SERVICE: &str = "session-service";

/// Component name on envelopes produced by the gateway itself.
pub const GATEWAY: &str = "gateway";

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `missing_token`.
    pub error: String,

    /// Human-readable message.
    pub message: String,

    /// When the error was produced.
    pub timestamp: Timestamp,

    /// Component that produced the error, or the unavailable backend.
    pub service: String,

    /// Request path, on proxy failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// An error rendered as an [`ErrorBody`] with a status code.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Error with an explicit status and code.
    pub fn new(
        status: StatusCode,
        error: &str,
        message: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.to_string(),
                message: message.into(),
                timestamp: Timestamp::now(),
                service: service.into(),
                path: None,
            },
        }
    }

    /// Malformed or incomplete request body.
    pub fn invalid_request(message: impl Into<String>, service: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, service)
    }

    /// Unexpected failure; the cause is logged, never rendered.
    pub fn internal(message: impl Into<String>, service: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            message,
            service,
        )
    }

    /// Attach the request path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.body.path = Some(path.into());
        self
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Envelope rendered to the client.
    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(self.body));
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[handler]
    async fn failing() -> Result<&'static str, ApiError> {
        Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "Token is required",
            GATEWAY,
        ))
    }

    #[tokio::test]
    async fn renders_envelope_with_status() -> TestResult {
        let service = Service::new(Router::with_path("fail").get(failing));

        let mut res = TestClient::get("http://example.com/fail")
            .send(&service)
            .await;

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
        assert_eq!(body["error"], "missing_token");
        assert_eq!(body["message"], "Token is required");
        assert_eq!(body["service"], "gateway");
        assert!(body["timestamp"].is_string(), "timestamp is rendered");
        assert!(body.get("path").is_none(), "path only on proxy failures");

        Ok(())
    }

    #[test]
    fn with_path_sets_path() {
        let error = ApiError::new(
            StatusCode::BAD_GATEWAY,
            "service_unavailable",
            "The data-service is currently unavailable",
            "data-service",
        )
        .with_path("/api/v1/data/tables");

        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(error.body().path.as_deref(), Some("/api/v1/data/tables"));
    }
}
