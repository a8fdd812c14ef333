//! Session service HTTP surface

use std::sync::Arc;

use barrest::health::HealthMonitor;
use salvo::{affix_state::inject, prelude::*, trailing_slash::remove_slash};

use crate::{errors::SESSION_SERVICE, healthcheck::HealthEndpoint, observability, state::State};

mod errors;
pub(crate) mod handlers;

/// Routes served by the session service.
pub fn router(state: Arc<State>, monitor: Arc<HealthMonitor>) -> Router {
    Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(remove_slash())
        .hoop(inject(state))
        .push(
            Router::with_path("api/v1/sessions")
                .push(Router::with_path("p/login").post(handlers::login::handler))
                .push(Router::with_path("p/validate").post(handlers::validate::handler))
                .push(
                    Router::with_path("p/health")
                        .get(HealthEndpoint::new(SESSION_SERVICE, monitor)),
                )
                .push(Router::with_path("logout").post(handlers::logout::handler)),
        )
}
