//! Gateway CORS policy

use std::time::Duration;

use salvo::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Cors, CorsHandler, ExposeHeaders},
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue, InvalidHeaderValue},
    },
};

use barrest_app::clients::REQUEST_ID_HEADER;

use crate::gateway::auth::RENEWED_TOKEN_HEADER;

const MAX_AGE: Duration = Duration::from_secs(86_400);

/// CORS for browser clients. `*` allows any origin; credentials are never allowed.
///
/// # Errors
///
/// Returns an error when `allowed_origin` is not a valid header value.
pub fn cors(allowed_origin: &str) -> Result<CorsHandler, InvalidHeaderValue> {
    let origin = if allowed_origin == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::exact(HeaderValue::from_str(allowed_origin)?)
    };

    Ok(Cors::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]))
        .expose_headers(ExposeHeaders::list([
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(RENEWED_TOKEN_HEADER),
        ]))
        .max_age(MAX_AGE)
        .into_handler())
}
