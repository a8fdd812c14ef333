//! Validate Session Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde::Deserialize;
use tracing::debug;

use barrest_app::sessions::data::ValidationResponse;

use crate::{
    errors::{ApiError, SESSION_SERVICE},
    extensions::*,
    sessions::errors::into_api_error,
    state::State,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ValidateRequest {
    #[serde(default)]
    pub token: String,
}

/// `POST /api/v1/sessions/p/validate`
///
/// Negative outcomes are `200` with `valid: false`; only a malformed body or an internal failure
/// is an error status.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<ValidationResponse>, ApiError> {
    let request = req.parse_json::<ValidateRequest>().await.map_err(|source| {
        debug!("rejected validation body: {source}");

        ApiError::invalid_request("Invalid request", SESSION_SERVICE)
    })?;

    let state = depot.obtain_or_500::<Arc<State>>(SESSION_SERVICE)?;

    let validation = state
        .sessions
        .validate_session(&request.token)
        .await
        .map_err(|error| into_api_error(error, "Validation failed"))?;

    Ok(Json(validation.into()))
}
