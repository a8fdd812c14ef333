//! Session tokens

mod claims;
mod codec;
mod errors;
mod secret;

pub use claims::{StaffClaims, TokenSubject};
pub use codec::{IssuedToken, TokenCodec, fingerprint, generate_session_id};
pub use errors::TokenError;
pub use secret::SigningSecret;

/// Issuer stamped into tokens when none is configured.
pub const DEFAULT_ISSUER: &str = "barrest-session-service";

/// Number of random bytes in a session identifier.
pub const SESSION_ID_BYTES: usize = 16;
