//! Staff records.

use barrest::tokens::TokenSubject;
use jiff::Timestamp;

use crate::{domain::staff::data::StaffProfile, passwords::PasswordHash, uuids::TypedUuid};

pub type StaffUuid = TypedUuid<StaffRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRecord {
    pub uuid: StaffUuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: PasswordHash,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StaffRecord {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Principal fields to bind into a session token.
    #[must_use]
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            staff_id: self.uuid.to_string(),
            username: self.username.clone(),
            role: self.role.clone(),
            full_name: self.full_name(),
        }
    }

    /// Outward projection without the password hash.
    #[must_use]
    pub fn profile(&self) -> StaffProfile {
        StaffProfile {
            id: self.uuid,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
            role: self.role.clone(),
            is_active: self.is_active,
            last_login_at: self.last_login_at,
        }
    }
}
