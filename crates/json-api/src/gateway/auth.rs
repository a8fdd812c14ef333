//! Gateway auth middleware.

use std::sync::Arc;

use salvo::{
    http::{
        HeaderName,
        header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue},
    },
    prelude::*,
};
use tracing::{debug, error};

use barrest_app::sessions::data::ValidationResponse;

use crate::{
    errors::{ApiError, GATEWAY},
    extensions::*,
    gateway::{
        GatewayState,
        identity::{USER_ID_HEADER, USER_PERMISSIONS_HEADER, USER_ROLE_HEADER, USERNAME_HEADER},
    },
};

/// Response header carrying a replacement token after sliding renewal.
pub const RENEWED_TOKEN_HEADER: &str = "x-renewed-token";

/// Validate the bearer token against the session service and stamp the identity headers on the
/// request before it is forwarded.
#[handler]
pub(crate) async fn authenticate(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req).map(str::to_owned) else {
        res.render(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "Token is required",
            GATEWAY,
        ));

        return;
    };

    let state = match depot.obtain_or_500::<Arc<GatewayState>>(GATEWAY) {
        Ok(state) => Arc::clone(state),
        Err(error) => {
            res.render(error);

            return;
        }
    };

    let request_id = depot.request_id().map(str::to_owned);

    let validation = match state.validator.validate(&token, request_id).await {
        Ok(validation) => validation,
        Err(source) => {
            error!("session validation error: {source}");

            res.render(validation_error());

            return;
        }
    };

    if !validation.valid {
        debug!(reason = ?validation.message, "rejected session");

        res.render(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_session",
            validation
                .message
                .unwrap_or_else(|| "Invalid session".to_string()),
            GATEWAY,
        ));

        return;
    }

    let identity = match identity_headers(&validation) {
        Ok(identity) => identity,
        Err(source) => {
            error!("session identity cannot be encoded as headers: {source}");

            res.render(validation_error());

            return;
        }
    };

    req.headers_mut().extend(identity);

    if let Some(renewed) = validation.token.as_deref() {
        match HeaderValue::from_str(renewed) {
            Ok(value) => {
                res.headers_mut().insert(RENEWED_TOKEN_HEADER, value);
            }
            Err(source) => error!("renewed token cannot be encoded as a header: {source}"),
        }
    }

    ctrl.call_next(req, depot, res).await;
}

fn validation_error() -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "validation_error",
        "Failed to validate session",
        GATEWAY,
    )
}

fn identity_headers(
    validation: &ValidationResponse,
) -> Result<Vec<(Option<HeaderName>, HeaderValue)>, InvalidHeaderValue> {
    let mut headers = Vec::with_capacity(4);

    let fields = [
        (USER_ID_HEADER, validation.staff_id.as_deref()),
        (USERNAME_HEADER, validation.username.as_deref()),
        (USER_ROLE_HEADER, validation.role.as_deref()),
    ];

    for (name, value) in fields {
        headers.push((
            Some(HeaderName::from_static(name)),
            HeaderValue::from_bytes(value.unwrap_or_default().as_bytes())?,
        ));
    }

    if !validation.permissions.is_empty() {
        headers.push((
            Some(HeaderName::from_static(USER_PERMISSIONS_HEADER)),
            HeaderValue::from_bytes(validation.permissions.join(",").as_bytes())?,
        ));
    }

    Ok(headers)
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
