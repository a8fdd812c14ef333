//! Staff Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    domain::{
        staff::{
            data::NewStaff,
            records::{StaffRecord, StaffUuid},
        },
        store::StoreError,
    },
    passwords::PasswordHash,
};

const FIND_STAFF_BY_USERNAME_SQL: &str = include_str!("sql/find_staff_by_username.sql");
const FIND_STAFF_BY_UUID_SQL: &str = include_str!("sql/find_staff_by_uuid.sql");
const TOUCH_LAST_LOGIN_SQL: &str = include_str!("sql/touch_last_login.sql");
const CREATE_STAFF_SQL: &str = include_str!("sql/create_staff.sql");
const SET_STAFF_ACTIVE_SQL: &str = include_str!("sql/set_staff_active.sql");

#[automock]
#[async_trait]
/// Credential store operations.
pub trait StaffRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<StaffRecord>, StoreError>;

    async fn find_by_uuid(&self, uuid: StaffUuid) -> Result<Option<StaffRecord>, StoreError>;

    async fn touch_last_login(&self, uuid: StaffUuid, at: Timestamp) -> Result<(), StoreError>;

    async fn create_staff(&self, staff: NewStaff) -> Result<StaffRecord, StoreError>;

    /// Returns whether a row with that username existed.
    async fn set_active(&self, username: &str, is_active: bool) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
/// PostgreSQL-backed staff repository.
pub struct PgStaffRepository {
    pool: PgPool,
}

impl PgStaffRepository {
    /// Repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffRepository for PgStaffRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<StaffRecord>, StoreError> {
        query_as::<Postgres, StaffRecord>(FIND_STAFF_BY_USERNAME_SQL)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_by_uuid(&self, uuid: StaffUuid) -> Result<Option<StaffRecord>, StoreError> {
        query_as::<Postgres, StaffRecord>(FIND_STAFF_BY_UUID_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn touch_last_login(&self, uuid: StaffUuid, at: Timestamp) -> Result<(), StoreError> {
        query(TOUCH_LAST_LOGIN_SQL)
            .bind(uuid.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_staff(&self, staff: NewStaff) -> Result<StaffRecord, StoreError> {
        query_as::<Postgres, StaffRecord>(CREATE_STAFF_SQL)
            .bind(staff.uuid.into_uuid())
            .bind(staff.username)
            .bind(staff.email)
            .bind(staff.password_hash.as_str())
            .bind(staff.first_name)
            .bind(staff.last_name)
            .bind(staff.role)
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn set_active(&self, username: &str, is_active: bool) -> Result<bool, StoreError> {
        let result = query(SET_STAFF_ACTIVE_SQL)
            .bind(username)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'r> FromRow<'r, PgRow> for StaffRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: StaffUuid::from_uuid(row.try_get("uuid")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: PasswordHash::new(row.try_get::<String, _>("password_hash")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            role: row.try_get("role")?,
            is_active: row.try_get("is_active")?,
            last_login_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_login_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
