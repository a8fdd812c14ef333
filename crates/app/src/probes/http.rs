use std::time::Duration;

use async_trait::async_trait;
use barrest::health::{Probe, ProbeError};
use reqwest::{Client, StatusCode};

/// Marks probe traffic so dependencies can keep it out of their access logs.
pub const HEALTH_CHECK_HEADER: &str = "x-health-check";

/// Healthy iff `GET url` answers `200`.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    http: Client,
    url: String,
}

impl HttpProbe {
    /// Build a probe with its own client bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn target(&self) -> &str {
        &self.url
    }

    async fn check(&self) -> Result<(), ProbeError> {
        let response = self
            .http
            .get(&self.url)
            .header(HEALTH_CHECK_HEADER, "true")
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    ProbeError::TimedOut
                } else {
                    ProbeError::Unreachable(Box::new(error))
                }
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ProbeError::UnexpectedStatus(status.as_u16())),
        }
    }
}
