use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Principal fields bound into a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    /// Staff identifier, also used as the `sub` claim.
    pub staff_id: String,

    /// Login name.
    pub username: String,

    /// Staff role.
    pub role: String,

    /// Display name, `"{first} {last}"`.
    pub full_name: String,
}

/// Decoded payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffClaims {
    /// Staff identifier.
    pub staff_id: String,

    /// Login name.
    pub username: String,

    /// Staff role.
    pub role: String,

    /// Display name.
    pub full_name: String,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expires-at, seconds since the Unix epoch.
    pub exp: i64,

    /// Not-before, seconds since the Unix epoch.
    pub nbf: i64,

    /// Issuer.
    pub iss: String,

    /// Subject (the staff identifier).
    pub sub: String,

    /// Token identifier, random per issued token.
    pub jti: String,
}

impl StaffClaims {
    /// Whether the token had expired at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now.as_second() > self.exp
    }

    /// Time left before expiry, negative once expired.
    pub fn remaining_at(&self, now: Timestamp) -> SignedDuration {
        SignedDuration::from_secs(self.exp.saturating_sub(now.as_second()))
    }

    /// The principal fields carried by these claims.
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            staff_id: self.staff_id.clone(),
            username: self.username.clone(),
            role: self.role.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn claims(exp: i64) -> StaffClaims {
        StaffClaims {
            staff_id: "staff-1".to_string(),
            username: "alice".to_string(),
            role: "manager".to_string(),
            full_name: "Alice Smith".to_string(),
            iat: 0,
            exp,
            nbf: 0,
            iss: "issuer".to_string(),
            sub: "staff-1".to_string(),
            jti: "00112233445566778899aabbccddeeff".to_string(),
        }
    }

    #[test]
    fn expiry_is_exclusive_of_the_exp_second() -> TestResult {
        let claims = claims(100);

        assert!(
            !claims.is_expired_at(Timestamp::from_second(100)?),
            "token is still valid during its exp second"
        );
        assert!(
            claims.is_expired_at(Timestamp::from_second(101)?),
            "token expires after its exp second"
        );

        Ok(())
    }

    #[test]
    fn remaining_goes_negative_after_expiry() -> TestResult {
        let claims = claims(100);

        assert_eq!(
            claims.remaining_at(Timestamp::from_second(160)?),
            SignedDuration::from_secs(-60)
        );

        Ok(())
    }
}
