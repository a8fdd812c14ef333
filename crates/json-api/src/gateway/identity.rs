//! Identity headers owned by the gateway.

use salvo::{Request, handler, http::HeaderName};
use tracing::debug;

pub(crate) const USER_ID_HEADER: &str = "x-user-id";
pub(crate) const USERNAME_HEADER: &str = "x-username";
pub(crate) const USER_ROLE_HEADER: &str = "x-user-role";
pub(crate) const USER_PERMISSIONS_HEADER: &str = "x-user-permissions";

const IDENTITY_PREFIX: &str = "x-user-";

fn is_identity_header(name: &HeaderName) -> bool {
    name.as_str() == USERNAME_HEADER || name.as_str().starts_with(IDENTITY_PREFIX)
}

/// Drop client-supplied identity headers so only the auth middleware can set them.
#[handler]
pub(crate) async fn strip_identity_headers(req: &mut Request) {
    let forged: Vec<HeaderName> = req
        .headers()
        .keys()
        .filter(|name| is_identity_header(name))
        .cloned()
        .collect();

    for name in forged {
        debug!(header = %name, "dropping inbound identity header");

        req.headers_mut().remove(&name);
    }
}
