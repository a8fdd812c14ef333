//! State

use std::{fmt, sync::Arc};

use barrest_app::{context::AppContext, sessions::SessionsService};

/// Session service state injected into every request.
#[derive(Clone)]
pub struct State {
    pub(crate) sessions: Arc<dyn SessionsService>,
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State").finish_non_exhaustive()
    }
}

impl State {
    /// State over `sessions`.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionsService>) -> Self {
        Self { sessions }
    }

    /// State over the PostgreSQL-backed session service of `app`.
    #[must_use]
    pub fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self::new(app.sessions))
    }
}
