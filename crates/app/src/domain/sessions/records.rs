//! Session records.

use jiff::Timestamp;

use crate::domain::staff::records::StaffUuid;

/// One row per active login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub token: String,
    pub staff_uuid: StaffUuid,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
