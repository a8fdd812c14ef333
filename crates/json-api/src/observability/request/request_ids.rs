//! Request ID generation and header helpers.

use barrest_app::clients::REQUEST_ID_HEADER as HEADER;
use salvo::http::{HeaderMap, StatusCode, header::HeaderValue};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = HEADER;

pub(crate) const REQUEST_ID_DEPOT_KEY: &str = "request_id";

pub(super) fn resolve_request_id(header_value: Option<String>) -> String {
    header_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(generate_request_id)
}

pub(super) fn set_request_id_header(headers: &mut HeaderMap, request_id: &str) {
    let header_value = match HeaderValue::from_str(request_id) {
        Ok(value) => value,
        Err(source) => {
            warn!(request_id, "could not encode request id header: {source}");

            return;
        }
    };

    headers.insert(REQUEST_ID_HEADER, header_value);
}

pub(super) fn response_status_or_ok(status_code: Option<StatusCode>) -> StatusCode {
    status_code.unwrap_or(StatusCode::OK)
}

fn generate_request_id() -> String {
    Uuid::now_v7().to_string()
}
