use std::fmt;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::tokens::{SESSION_ID_BYTES, SigningSecret, StaffClaims, TokenError, TokenSubject};

/// Algorithms accepted on verification. Tokens are always signed with HS256.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact serialized token.
    pub token: String,

    /// Expiry instant (`exp` claim).
    pub expires_at: Timestamp,
}

/// Stateless signer and verifier for session tokens.
///
/// Verification checks the signature, the algorithm family, the issuer and `nbf`. It does not
/// check `exp`; callers compare it themselves to tell an expired token from a forged one.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: SignedDuration,
}

impl TokenCodec {
    /// Build a codec over a shared secret.
    pub fn new(secret: &SigningSecret, issuer: impl Into<String>, ttl: SignedDuration) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.validate_nbf = true;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> SignedDuration {
        self.ttl
    }

    /// Sign a token for `subject`, valid from now for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] when the expiry overflows or signing fails.
    pub fn issue(&self, subject: &TokenSubject) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, Timestamp::now())
    }

    /// Sign a token for `subject` as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] when the expiry overflows or signing fails.
    pub fn issue_at(
        &self,
        subject: &TokenSubject,
        issued_at: Timestamp,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at
            .checked_add(self.ttl)
            .map_err(TokenError::ExpiryOutOfRange)?;

        let claims = StaffClaims {
            staff_id: subject.staff_id.clone(),
            username: subject.username.clone(),
            role: subject.role.clone(),
            full_name: subject.full_name.clone(),
            iat: issued_at.as_second(),
            exp: expires_at.as_second(),
            nbf: issued_at.as_second(),
            iss: self.issuer.clone(),
            sub: subject.staff_id.clone(),
            jti: generate_session_id(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encode)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for a bad signature, a non-HMAC or unsigned algorithm, a
    /// foreign issuer, a future `nbf` or a malformed token.
    pub fn verify(&self, token: &str) -> Result<StaffClaims, TokenError> {
        decode::<StaffClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// SHA-256 of the raw token, lower-case hex.
pub fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Fresh random session identifier: 16 bytes from the OS RNG, lower-case hex.
pub fn generate_session_id() -> String {
    let mut bytes = [0_u8; SESSION_ID_BYTES];

    OsRng.fill_bytes(&mut bytes);

    hex::encode(bytes)
}
