//! Sessions service errors.

use barrest::tokens::TokenError;
use thiserror::Error;

use crate::{domain::store::StoreError, passwords::PasswordError};

#[derive(Debug, Error)]
pub enum SessionsServiceError {
    /// Unknown user, inactive user or wrong password; callers cannot tell which.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("session identifier collision")]
    SessionCollision,

    #[error("storage error")]
    Store(#[source] StoreError),

    #[error("token processing error")]
    Token(#[from] TokenError),

    #[error("password verification error")]
    Password(#[from] PasswordError),
}

impl From<StoreError> for SessionsServiceError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
