use thiserror::Error;

/// Errors raised while signing or verifying session tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing the claim set failed.
    #[error("failed to sign token")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Signature, algorithm, issuer or format check failed.
    #[error("token is invalid")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// The configured lifetime pushes expiry outside the representable range.
    #[error("token expiry is out of range")]
    ExpiryOutOfRange(#[source] jiff::Error),
}
