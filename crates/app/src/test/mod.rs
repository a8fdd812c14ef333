//! Test support: database harness, in-memory repositories and fixtures.

mod context;
mod db;

pub use context::TestContext;
pub use memory::{InMemorySessions, InMemoryStaff};

use jiff::Timestamp;

use crate::{
    domain::staff::{
        data::NewStaff,
        records::{StaffRecord, StaffUuid},
    },
    passwords::PasswordHash,
};

/// Cheapest bcrypt cost, so hashing in tests stays fast.
pub const TEST_PASSWORD_COST: u32 = 4;

fn capitalised(value: &str) -> String {
    let mut chars = value.chars();

    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

pub fn new_staff(username: &str, password_hash: &str) -> NewStaff {
    NewStaff {
        uuid: StaffUuid::new(),
        username: username.to_string(),
        email: Some(format!("{username}@barrest.test")),
        password_hash: PasswordHash::new(password_hash),
        first_name: capitalised(username),
        last_name: "Example".to_string(),
        role: "manager".to_string(),
    }
}

pub fn staff_record(username: &str, password_hash: PasswordHash) -> StaffRecord {
    let now = Timestamp::now();

    StaffRecord {
        uuid: StaffUuid::new(),
        username: username.to_string(),
        email: Some(format!("{username}@barrest.test")),
        password_hash,
        first_name: capitalised(username),
        last_name: "Example".to_string(),
        role: "manager".to_string(),
        is_active: true,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}
