//! Session data.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::domain::staff::{data::StaffProfile, records::StaffUuid};

#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: String,
    pub token: String,
    pub staff_uuid: StaffUuid,
    pub expires_at: Timestamp,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub session_id: String,
    pub token: String,
    pub expires_at: Timestamp,
    pub staff: StaffProfile,
}

/// Why a token did not validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    MissingToken,
    InvalidToken,
    Expired,
    SessionNotFound,
    UserNotFound,
}

impl InvalidReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingToken => "Token is required",
            Self::InvalidToken => "Invalid token",
            Self::Expired => "Session expired",
            Self::SessionNotFound => "Session not found",
            Self::UserNotFound => "User not found",
        }
    }
}

/// A session that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSession {
    pub session_id: String,
    pub staff_id: StaffUuid,
    pub username: String,
    pub role: String,
    pub full_name: String,

    /// Replacement token when the presented one was close to expiry.
    pub renewed_token: Option<String>,
}

/// Outcome of validating a token. Negative outcomes are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidation {
    Valid(ValidSession),
    Invalid(InvalidReason),
}

impl SessionValidation {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Outcome of a logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    Revoked { session_id: String },
    NotFound,
}

/// Wire format of a validation result, shared by the session service and the gateway client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl From<SessionValidation> for ValidationResponse {
    fn from(value: SessionValidation) -> Self {
        match value {
            SessionValidation::Valid(session) => Self {
                valid: true,
                session_id: Some(session.session_id),
                message: Some("Session is valid".to_string()),
                staff_id: Some(session.staff_id.to_string()),
                username: Some(session.username),
                role: Some(session.role),
                full_name: Some(session.full_name),
                permissions: Vec::new(),
                token: session.renewed_token,
            },
            SessionValidation::Invalid(reason) => Self {
                valid: false,
                message: Some(reason.message().to_string()),
                ..Self::default()
            },
        }
    }
}
