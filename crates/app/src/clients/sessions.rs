//! Session service client used by the gateway.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::{
    clients::{
        GATEWAY_SERVICE_HEADER, GATEWAY_SERVICE_NAME, GATEWAY_SESSION_MANAGED_HEADER,
        REQUEST_ID_HEADER,
    },
    domain::sessions::data::ValidationResponse,
};

/// Path of the validation endpoint on the session service.
pub const VALIDATE_PATH: &str = "/api/v1/sessions/p/validate";

#[derive(Debug, Error)]
pub enum SessionClientError {
    #[error("session service request failed")]
    Http(#[from] reqwest::Error),

    #[error("session service answered with status {0}")]
    Status(u16),
}

#[automock]
#[async_trait]
/// Remote token validation.
pub trait SessionValidator: Send + Sync {
    /// Validate `token`, propagating the caller's correlation id.
    async fn validate(
        &self,
        token: &str,
        request_id: Option<String>,
    ) -> Result<ValidationResponse, SessionClientError>;
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpSessionClient {
    http: Client,
    validate_url: String,
}

impl HttpSessionClient {
    /// Client for the session service at `base_url`, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SessionClientError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            validate_url: format!("{}{VALIDATE_PATH}", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl SessionValidator for HttpSessionClient {
    async fn validate(
        &self,
        token: &str,
        request_id: Option<String>,
    ) -> Result<ValidationResponse, SessionClientError> {
        let mut request = self
            .http
            .post(&self.validate_url)
            .header(GATEWAY_SERVICE_HEADER, GATEWAY_SERVICE_NAME)
            .header(GATEWAY_SESSION_MANAGED_HEADER, "true")
            .json(&ValidateRequest { token });

        if let Some(request_id) = request_id {
            request = request.header(REQUEST_ID_HEADER, request_id);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(SessionClientError::Status(status.as_u16()));
        }

        Ok(response.json::<ValidationResponse>().await?)
    }
}
