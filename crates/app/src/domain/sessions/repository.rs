//! Sessions Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    sessions::{data::NewSession, records::SessionRecord},
    staff::records::StaffUuid,
    store::StoreError,
};

const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");
const FIND_SESSION_BY_TOKEN_SQL: &str = include_str!("sql/find_session_by_token.sql");
const FIND_SESSION_BY_ID_SQL: &str = include_str!("sql/find_session_by_id.sql");
const UPDATE_SESSION_TOKEN_SQL: &str = include_str!("sql/update_session_token.sql");
const DELETE_SESSION_BY_TOKEN_SQL: &str = include_str!("sql/delete_session_by_token.sql");

#[automock]
#[async_trait]
/// Session row persistence.
pub trait SessionsRepository: Send + Sync {
    /// Insert a new row. An existing session id is [`StoreError::AlreadyExists`], never overwritten.
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>, StoreError>;

    async fn find_by_id(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Replace the stored token. Returns whether the row still existed.
    async fn update_token(
        &self,
        session_id: &str,
        token: &str,
        expires_at: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Delete the row holding `token`, returning its session id.
    async fn delete_by_token(&self, token: &str) -> Result<Option<String>, StoreError>;
}

/// PostgreSQL-backed sessions repository.
#[derive(Debug, Clone)]
pub struct PgSessionsRepository {
    pool: PgPool,
}

impl PgSessionsRepository {
    /// Repository over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionsRepository for PgSessionsRepository {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord, StoreError> {
        query_as::<Postgres, SessionRecord>(CREATE_SESSION_SQL)
            .bind(session.session_id)
            .bind(session.token)
            .bind(session.staff_uuid.into_uuid())
            .bind(SqlxTimestamp::from(session.expires_at))
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        query_as::<Postgres, SessionRecord>(FIND_SESSION_BY_TOKEN_SQL)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        query_as::<Postgres, SessionRecord>(FIND_SESSION_BY_ID_SQL)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn update_token(
        &self,
        session_id: &str,
        token: &str,
        expires_at: Timestamp,
    ) -> Result<bool, StoreError> {
        let result = query(UPDATE_SESSION_TOKEN_SQL)
            .bind(session_id)
            .bind(token)
            .bind(SqlxTimestamp::from(expires_at))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_token(&self, token: &str) -> Result<Option<String>, StoreError> {
        query_scalar::<Postgres, String>(DELETE_SESSION_BY_TOKEN_SQL)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }
}

impl<'r> FromRow<'r, PgRow> for SessionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            token: row.try_get("token")?,
            staff_uuid: StaffUuid::from_uuid(row.try_get("staff_uuid")?),
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::staff::{PgStaffRepository, StaffRepository},
        test::{TestContext, new_staff},
    };

    use super::*;

    async fn staff_uuid(ctx: &TestContext) -> TestResult<StaffUuid> {
        let staff = PgStaffRepository::new(ctx.db.pool().clone())
            .create_staff(new_staff("alice", "hash"))
            .await?;

        Ok(staff.uuid)
    }

    fn new_session(session_id: &str, token: &str, staff_uuid: StaffUuid) -> NewSession {
        NewSession {
            session_id: session_id.to_string(),
            token: token.to_string(),
            staff_uuid,
            expires_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn create_and_find_by_token_and_id() -> TestResult {
        let ctx = TestContext::new().await;
        let repository = PgSessionsRepository::new(ctx.db.pool().clone());
        let staff_uuid = staff_uuid(&ctx).await?;

        let created = repository
            .create_session(new_session("s1", "token-1", staff_uuid))
            .await?;

        assert_eq!(repository.find_by_token("token-1").await?, Some(created.clone()));
        assert_eq!(repository.find_by_id("s1").await?, Some(created));
        assert!(repository.find_by_token("token-2").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn duplicate_session_id_is_not_overwritten() -> TestResult {
        let ctx = TestContext::new().await;
        let repository = PgSessionsRepository::new(ctx.db.pool().clone());
        let staff_uuid = staff_uuid(&ctx).await?;

        repository
            .create_session(new_session("s1", "token-1", staff_uuid))
            .await?;

        let result = repository
            .create_session(new_session("s1", "token-2", staff_uuid))
            .await;

        assert!(
            matches!(result, Err(StoreError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );
        assert!(repository.find_by_token("token-1").await?.is_some());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn update_token_keeps_session_id() -> TestResult {
        let ctx = TestContext::new().await;
        let repository = PgSessionsRepository::new(ctx.db.pool().clone());
        let staff_uuid = staff_uuid(&ctx).await?;

        repository
            .create_session(new_session("s1", "token-1", staff_uuid))
            .await?;

        assert!(
            repository
                .update_token("s1", "token-2", Timestamp::now())
                .await?
        );
        assert!(repository.find_by_token("token-1").await?.is_none());
        assert_eq!(
            repository
                .find_by_id("s1")
                .await?
                .map(|session| session.token),
            Some("token-2".to_string())
        );
        assert!(
            !repository
                .update_token("missing", "token-3", Timestamp::now())
                .await?
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn delete_by_token_returns_session_id_once() -> TestResult {
        let ctx = TestContext::new().await;
        let repository = PgSessionsRepository::new(ctx.db.pool().clone());
        let staff_uuid = staff_uuid(&ctx).await?;

        repository
            .create_session(new_session("s1", "token-1", staff_uuid))
            .await?;

        assert_eq!(
            repository.delete_by_token("token-1").await?,
            Some("s1".to_string())
        );
        assert_eq!(repository.delete_by_token("token-1").await?, None);

        Ok(())
    }
}
