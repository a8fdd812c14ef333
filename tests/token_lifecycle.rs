//! Integration test for a token as the session service sees it over its lifetime.
//!
//! Issue, verify, age past half of the lifetime (renewal window), and finally expire, using a
//! shared secret as both services would.

use jiff::{SignedDuration, Timestamp};
use testresult::TestResult;

use barrest::tokens::{
    DEFAULT_ISSUER, SigningSecret, TokenCodec, TokenError, TokenSubject, fingerprint,
};

fn codec(secret: &str) -> TokenCodec {
    TokenCodec::new(
        &SigningSecret::from(secret),
        DEFAULT_ISSUER,
        SignedDuration::from_hours(24),
    )
}

fn bartender() -> TokenSubject {
    TokenSubject {
        staff_id: "0190a1b2-0000-7000-8000-00000000000b".to_string(),
        username: "bob".to_string(),
        role: "bartender".to_string(),
        full_name: "Bob Jones".to_string(),
    }
}

#[test]
fn token_ages_through_its_lifetime() -> TestResult {
    let codec = codec("shared-secret");
    let issued_at = Timestamp::now().checked_sub(SignedDuration::from_hours(13))?;

    let issued = codec.issue_at(&bartender(), issued_at)?;
    let claims = codec.verify(&issued.token)?;

    assert!(!claims.is_expired_at(Timestamp::now()), "still valid at 13h");
    assert!(
        claims.remaining_at(Timestamp::now()) < codec.ttl() / 2,
        "past half of the lifetime"
    );

    let renewed = codec.issue(&claims.subject())?;

    assert_ne!(renewed.token, issued.token, "renewal signs a new token");
    assert_ne!(fingerprint(&renewed.token), fingerprint(&issued.token));
    assert!(renewed.expires_at > issued.expires_at, "renewal pushes expiry out");

    let later = issued.expires_at.checked_add(SignedDuration::from_secs(1))?;

    assert!(claims.is_expired_at(later), "expired one second after exp");

    Ok(())
}

#[test]
fn services_with_different_secrets_disagree() -> TestResult {
    let token = codec("session-secret").issue(&bartender())?.token;

    assert!(
        matches!(
            codec("gateway-secret").verify(&token),
            Err(TokenError::Invalid(_))
        ),
        "secret mismatch is an invalid token"
    );

    Ok(())
}
