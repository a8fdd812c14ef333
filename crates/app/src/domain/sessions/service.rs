//! Sessions service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use barrest::tokens::{TokenCodec, generate_session_id};
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        sessions::{
            PgSessionsRepository, SessionsRepository, SessionsServiceError,
            data::{
                CreatedSession, InvalidReason, LogoutOutcome, NewSession, SessionValidation,
                ValidSession,
            },
            records::SessionRecord,
        },
        staff::{
            PgStaffRepository, StaffRepository,
            records::{StaffRecord, StaffUuid},
        },
        store::StoreError,
    },
    passwords::{DEFAULT_COST, PasswordHash, hash_password, verify_password},
};

/// Tokens with less than this left are reissued on validation.
pub const RENEWAL_WINDOW: SignedDuration = SignedDuration::from_mins(5);

const DECOY_PASSWORD: &str = "barrest-decoy-password";

#[automock]
#[async_trait]
/// Session lifecycle operations.
pub trait SessionsService: Send + Sync {
    /// Verify credentials and open a session.
    async fn create_session(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CreatedSession, SessionsServiceError>;

    /// Check a token against its persisted session, renewing it when close to expiry.
    async fn validate_session(&self, token: &str)
    -> Result<SessionValidation, SessionsServiceError>;

    /// Delete the session holding `token`.
    async fn logout(&self, token: &str) -> Result<LogoutOutcome, SessionsServiceError>;
}

/// Session lifecycle over the staff and session stores.
pub struct PgSessionsService {
    staff: Arc<dyn StaffRepository>,
    sessions: Arc<dyn SessionsRepository>,
    codec: TokenCodec,
    password_cost: u32,
    decoy_hash: OnceCell<PasswordHash>,
}

impl PgSessionsService {
    /// Service backed by the PostgreSQL repositories on `pool`.
    #[must_use]
    pub fn new(pool: PgPool, codec: TokenCodec) -> Self {
        Self::with_repositories(
            Arc::new(PgStaffRepository::new(pool.clone())),
            Arc::new(PgSessionsRepository::new(pool)),
            codec,
        )
    }

    /// Service over arbitrary repositories.
    #[must_use]
    pub fn with_repositories(
        staff: Arc<dyn StaffRepository>,
        sessions: Arc<dyn SessionsRepository>,
        codec: TokenCodec,
    ) -> Self {
        Self {
            staff,
            sessions,
            codec,
            password_cost: DEFAULT_COST,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Work factor of the decoy hash checked for unknown users. Match the cost of stored hashes.
    #[must_use]
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Spend the same bcrypt time on an unknown user as on a real one.
    async fn verify_decoy(&self, password: &str) -> Result<(), SessionsServiceError> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| hash_password(DECOY_PASSWORD, self.password_cost))
            .await?;

        let _decoy_matches = verify_password(password, decoy).await?;

        Ok(())
    }

    async fn renew(&self, session: &SessionRecord, staff: &StaffRecord) -> Option<String> {
        let issued = match self.codec.issue(&staff.token_subject()) {
            Ok(issued) => issued,
            Err(error) => {
                warn!(session_id = session.session_id, %error, "failed to issue renewed token");
                return None;
            }
        };

        // No compare-and-set: concurrent renewals of one session race and the last write wins.
        match self
            .sessions
            .update_token(&session.session_id, &issued.token, issued.expires_at)
            .await
        {
            Ok(true) => {
                info!(session_id = session.session_id, "session token renewed");
                Some(issued.token)
            }
            Ok(false) => {
                warn!(session_id = session.session_id, "session vanished before renewal");
                None
            }
            Err(error) => {
                warn!(session_id = session.session_id, %error, "failed to store renewed token");
                None
            }
        }
    }
}

impl fmt::Debug for PgSessionsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSessionsService")
            .field("codec", &self.codec)
            .field("password_cost", &self.password_cost)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionsService for PgSessionsService {
    async fn create_session(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CreatedSession, SessionsServiceError> {
        let candidate = self.staff.find_by_username(username).await?;

        let Some(staff) = candidate.filter(|staff| staff.is_active) else {
            self.verify_decoy(password).await?;

            debug!(username, "login rejected for unknown or inactive user");

            return Err(SessionsServiceError::InvalidCredentials);
        };

        if !verify_password(password, &staff.password_hash).await? {
            debug!(username, "login rejected for wrong password");

            return Err(SessionsServiceError::InvalidCredentials);
        }

        let session_id = generate_session_id();
        let issued = self.codec.issue(&staff.token_subject())?;

        self.sessions
            .create_session(NewSession {
                session_id: session_id.clone(),
                token: issued.token.clone(),
                staff_uuid: staff.uuid,
                expires_at: issued.expires_at,
            })
            .await
            .map_err(|error| match error {
                StoreError::AlreadyExists => SessionsServiceError::SessionCollision,
                other => SessionsServiceError::Store(other),
            })?;

        if let Err(error) = self
            .staff
            .touch_last_login(staff.uuid, Timestamp::now())
            .await
        {
            warn!(staff_id = %staff.uuid, %error, "failed to update last login");
        }

        info!(session_id, staff_id = %staff.uuid, "session created");

        Ok(CreatedSession {
            session_id,
            token: issued.token,
            expires_at: issued.expires_at,
            staff: staff.profile(),
        })
    }

    async fn validate_session(
        &self,
        token: &str,
    ) -> Result<SessionValidation, SessionsServiceError> {
        if token.is_empty() {
            return Ok(SessionValidation::Invalid(InvalidReason::MissingToken));
        }

        let claims = match self.codec.verify(token) {
            Ok(claims) => claims,
            Err(error) => {
                debug!(%error, "token rejected");

                return Ok(SessionValidation::Invalid(InvalidReason::InvalidToken));
            }
        };

        let now = Timestamp::now();

        if claims.is_expired_at(now) {
            return Ok(match self.sessions.delete_by_token(token).await {
                Ok(Some(session_id)) => {
                    info!(session_id, "expired session removed");
                    SessionValidation::Invalid(InvalidReason::Expired)
                }
                Ok(None) => SessionValidation::Invalid(InvalidReason::SessionNotFound),
                Err(error) => {
                    warn!(%error, "failed to remove expired session");
                    SessionValidation::Invalid(InvalidReason::Expired)
                }
            });
        }

        let Some(session) = self.sessions.find_by_token(token).await? else {
            return Ok(SessionValidation::Invalid(InvalidReason::SessionNotFound));
        };

        let staff = match claims.staff_id.parse::<StaffUuid>() {
            Ok(uuid) => self.staff.find_by_uuid(uuid).await?,
            Err(error) => {
                warn!(session_id = session.session_id, %error, "token names a malformed staff id");
                None
            }
        };

        let Some(staff) = staff.filter(|staff| staff.is_active) else {
            return Ok(SessionValidation::Invalid(InvalidReason::UserNotFound));
        };

        let renewed_token = if claims.remaining_at(now) < RENEWAL_WINDOW {
            self.renew(&session, &staff).await
        } else {
            None
        };

        Ok(SessionValidation::Valid(ValidSession {
            full_name: staff.full_name(),
            session_id: session.session_id,
            staff_id: staff.uuid,
            username: staff.username,
            role: staff.role,
            renewed_token,
        }))
    }

    async fn logout(&self, token: &str) -> Result<LogoutOutcome, SessionsServiceError> {
        match self.sessions.delete_by_token(token).await? {
            Some(session_id) => {
                info!(session_id, "session revoked");
                Ok(LogoutOutcome::Revoked { session_id })
            }
            None => Ok(LogoutOutcome::NotFound),
        }
    }
}
