//! Staff data.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{domain::staff::records::StaffUuid, passwords::PasswordHash};

#[derive(Debug, Clone)]
pub struct NewStaff {
    pub uuid: StaffUuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: PasswordHash,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// Staff member as shown to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub id: StaffUuid,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<Timestamp>,
}
