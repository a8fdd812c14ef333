//! Login Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use barrest_app::staff::data::StaffProfile;

use crate::{
    errors::{ApiError, SESSION_SERVICE},
    extensions::*,
    sessions::errors::into_api_error,
    state::State,
};

/// Login Request
#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login Response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LoginResponse {
    pub session_id: String,
    pub token: String,
    pub expires_at: Timestamp,
    pub message: String,
    pub staff: StaffProfile,
}

/// `POST /api/v1/sessions/p/login`
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = req.parse_json::<LoginRequest>().await.map_err(|source| {
        debug!("rejected login body: {source}");

        ApiError::invalid_request("Invalid request format", SESSION_SERVICE)
    })?;

    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::invalid_request(
            "Username and password are required",
            SESSION_SERVICE,
        ));
    }

    let state = depot.obtain_or_500::<Arc<State>>(SESSION_SERVICE)?;

    let session = state
        .sessions
        .create_session(&request.username, &request.password)
        .await
        .map_err(|error| into_api_error(error, "Login failed"))?;

    info!(
        username = %session.staff.username,
        session_id = %session.session_id,
        "login successful"
    );

    res.status_code(StatusCode::CREATED);

    Ok(Json(LoginResponse {
        session_id: session.session_id,
        token: session.token,
        expires_at: session.expires_at,
        message: "Login successful".to_string(),
        staff: session.staff,
    }))
}
