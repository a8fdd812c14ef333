//! Logout Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use barrest_app::sessions::data::LogoutOutcome;

use crate::{
    errors::{ApiError, SESSION_SERVICE},
    extensions::*,
    sessions::errors::into_api_error,
    state::State,
};

#[derive(Debug, Deserialize)]
pub(crate) struct LogoutRequest {
    #[serde(default)]
    pub token: String,
}

/// Logout Response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LogoutResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub message: String,
}

impl From<LogoutOutcome> for LogoutResponse {
    fn from(outcome: LogoutOutcome) -> Self {
        match outcome {
            LogoutOutcome::Revoked { session_id } => Self {
                success: true,
                session_id: Some(session_id),
                message: "Logged out successfully".to_string(),
            },
            LogoutOutcome::NotFound => Self {
                success: false,
                session_id: None,
                message: "Session not found".to_string(),
            },
        }
    }
}

/// `POST /api/v1/sessions/logout`
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<LogoutResponse>, ApiError> {
    let request = req.parse_json::<LogoutRequest>().await.map_err(|source| {
        debug!("rejected logout body: {source}");

        ApiError::invalid_request("Invalid request", SESSION_SERVICE)
    })?;

    if request.token.is_empty() {
        return Err(ApiError::invalid_request(
            "Token is required",
            SESSION_SERVICE,
        ));
    }

    let state = depot.obtain_or_500::<Arc<State>>(SESSION_SERVICE)?;

    let outcome = state
        .sessions
        .logout(&request.token)
        .await
        .map_err(|error| into_api_error(error, "Logout failed"))?;

    if let LogoutOutcome::Revoked { session_id } = &outcome {
        info!(%session_id, "logout successful");
    }

    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use barrest_app::sessions::MockSessionsService;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{errors::ErrorBody, test_helpers::sessions_service};

    use super::*;

    fn make_service(sessions: MockSessionsService) -> Service {
        sessions_service(sessions, Router::with_path("logout").post(handler))
    }

    #[tokio::test]
    async fn test_logout_reports_removed_session() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_logout()
            .once()
            .withf(|token| token == "live-token")
            .return_once(|_| {
                Ok(LogoutOutcome::Revoked {
                    session_id: "s-1".to_string(),
                })
            });

        sessions.expect_create_session().never();
        sessions.expect_validate_session().never();

        let mut res = TestClient::post("http://example.com/logout")
            .json(&json!({ "token": "live-token" }))
            .send(&make_service(sessions))
            .await;

        let body: LogoutResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success);
        assert_eq!(body.session_id.as_deref(), Some("s-1"));
        assert_eq!(body.message, "Logged out successfully");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_an_error() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_logout()
            .once()
            .return_once(|_| Ok(LogoutOutcome::NotFound));

        sessions.expect_create_session().never();
        sessions.expect_validate_session().never();

        let mut res = TestClient::post("http://example.com/logout")
            .json(&json!({ "token": "gone" }))
            .send(&make_service(sessions))
            .await;

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body, json!({ "success": false, "message": "Session not found" }));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_token_returns_400() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions.expect_logout().never();
        sessions.expect_create_session().never();
        sessions.expect_validate_session().never();

        let mut res = TestClient::post("http://example.com/logout")
            .json(&json!({}))
            .send(&make_service(sessions))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.message, "Token is required");

        Ok(())
    }
}
