//! Password hashing

use std::fmt;

use bcrypt::BcryptError;
use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};
use zeroize::Zeroize;

/// Work factor for new hashes.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    Hash(#[from] BcryptError),

    #[error("password hashing task failed")]
    Task(#[from] JoinError),
}

/// A stored bcrypt hash. Never rendered by `Debug` and never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(**redacted**)")
    }
}

impl Drop for PasswordHash {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Hash `password` on the blocking pool.
///
/// # Errors
///
/// Returns an error when bcrypt rejects the input or the blocking task fails.
pub async fn hash_password(password: &str, cost: u32) -> Result<PasswordHash, PasswordError> {
    let password = password.to_string();

    let hash = spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    Ok(PasswordHash(hash))
}

/// Compare `password` against `hash` on the blocking pool.
///
/// # Errors
///
/// Returns an error when the stored hash is malformed or the blocking task fails.
pub async fn verify_password(password: &str, hash: &PasswordHash) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.clone();

    let matches = spawn_blocking(move || bcrypt::verify(password, hash.as_str())).await??;

    Ok(matches)
}
