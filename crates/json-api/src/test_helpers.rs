//! Test helpers.

use std::sync::Arc;

use barrest_app::{
    sessions::{MockSessionsService, data::CreatedSession},
    staff::{data::StaffProfile, records::StaffUuid},
};
use jiff::{SignedDuration, Timestamp};
use salvo::{affix_state::inject, prelude::*};

use crate::state::State;

pub(crate) fn state_with_sessions(sessions: MockSessionsService) -> Arc<State> {
    Arc::new(State::new(Arc::new(sessions)))
}

pub(crate) fn sessions_service(sessions: MockSessionsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_sessions(sessions)))
            .push(route),
    )
}

fn staff_profile(username: &str) -> StaffProfile {
    StaffProfile {
        id: StaffUuid::new(),
        username: username.to_string(),
        email: None,
        first_name: "Alice".to_string(),
        last_name: "Example".to_string(),
        full_name: "Alice Example".to_string(),
        role: "manager".to_string(),
        is_active: true,
        last_login_at: None,
    }
}

pub(crate) fn created_session(username: &str) -> CreatedSession {
    CreatedSession {
        session_id: "0123456789abcdef0123456789abcdef".to_string(),
        token: "header.payload.signature".to_string(),
        expires_at: Timestamp::now() + SignedDuration::from_hours(24),
        staff: staff_profile(username),
    }
}
