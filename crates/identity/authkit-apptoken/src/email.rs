use crate::claims::SignedClaims;
use crate::error::TokenResult;
use chrono::Duration;

/// Contents of a verified email token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailToken {
    pub login: String,
    pub email: String,
    /// Password hash of the user when the token was issued. Consumers compare it
    /// against the current hash and reject the token when they differ.
    pub password_hash: String,
}

/// Creates an email token for a user whose login is their email address.
pub fn new_email_token(
    issuer: &str,
    email: &str,
    password_hash: &str,
    expiration: Duration,
    sign_key: &[u8],
) -> TokenResult<String> {
    SignedClaims::new(issuer, email, password_hash, expiration).sign(sign_key)
}

/// Creates an email token for a user whose login differs from the email address.
pub fn new_email_token_with_login(
    issuer: &str,
    login: &str,
    email: &str,
    password_hash: &str,
    expiration: Duration,
    sign_key: &[u8],
) -> TokenResult<String> {
    let mut claims = SignedClaims::new(issuer, login, password_hash, expiration);
    if email != login {
        claims.eml = Some(email.to_string());
    }
    claims.sign(sign_key)
}

pub fn parse_email_token(issuer: &str, token: &str, sign_key: &[u8]) -> TokenResult<EmailToken> {
    let claims = SignedClaims::verify(issuer, token, sign_key)?;
    let email = claims.eml.unwrap_or_else(|| claims.aud.clone());
    Ok(EmailToken {
        login: claims.aud,
        email,
        password_hash: claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenFault;

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";

    #[test]
    fn test_email_token() {
        let token =
            new_email_token("zzz", "alice@example.com", HASH, Duration::hours(24), b"xxx").unwrap();

        let parsed = parse_email_token("zzz", &token, b"xxx").unwrap();
        assert_eq!(parsed.login, "alice@example.com");
        assert_eq!(parsed.email, "alice@example.com");
        assert_eq!(parsed.password_hash, HASH);
    }

    #[test]
    fn test_email_token_with_login() {
        let token = new_email_token_with_login(
            "zzz",
            "alice",
            "alice@example.com",
            HASH,
            Duration::hours(24),
            b"xxx",
        )
        .unwrap();

        let parsed = parse_email_token("zzz", &token, b"xxx").unwrap();
        assert_eq!(parsed.login, "alice");
        assert_eq!(parsed.email, "alice@example.com");
        assert_eq!(parsed.password_hash, HASH);
    }

    #[test]
    fn test_expired_email_token() {
        let token =
            new_email_token("zzz", "alice@example.com", HASH, Duration::minutes(-5), b"xxx")
                .unwrap();

        let err = parse_email_token("zzz", &token, b"xxx").unwrap_err();
        assert!(err.is_expired());
    }

    #[test]
    fn test_email_token_issuer_mismatch() {
        let token =
            new_email_token("zzz", "alice@example.com", HASH, Duration::hours(1), b"xxx").unwrap();

        let err = parse_email_token("other", &token, b"xxx").unwrap_err();
        assert_eq!(err.fault, TokenFault::IssuerMismatch);
    }

    #[test]
    fn test_empty_sign_key_is_rejected() {
        let err = new_email_token("zzz", "alice@example.com", HASH, Duration::hours(1), b"")
            .unwrap_err();
        assert!(matches!(err.fault, TokenFault::Malformed(_)));
    }
}
