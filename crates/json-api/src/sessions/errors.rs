//! Session Errors

use salvo::http::StatusCode;
use tracing::error;

use barrest_app::sessions::SessionsServiceError;

use crate::errors::{ApiError, SESSION_SERVICE};

pub(crate) fn into_api_error(error: SessionsServiceError, context: &str) -> ApiError {
    match error {
        SessionsServiceError::InvalidCredentials => ApiError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid username or password",
            SESSION_SERVICE,
        ),
        other => {
            error!("{context}: {other}");

            ApiError::internal(context.to_string(), SESSION_SERVICE)
        }
    }
}
