use crate::claims::SignedClaims;
use crate::error::TokenResult;
use chrono::Duration;

/// Contents of a verified state token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateToken {
    pub provider_id: String,
    /// Empty unless the token was created with [`new_state_token_with_login`].
    pub login: String,
}

/// Creates a state token for an OAuth2 code flow with `provider_id`.
pub fn new_state_token(
    issuer: &str,
    provider_id: &str,
    expiration: Duration,
    sign_key: &[u8],
) -> TokenResult<String> {
    new_state_token_with_login(issuer, provider_id, "", expiration, sign_key)
}

/// Creates a state token that also carries the login of an already identified user.
pub fn new_state_token_with_login(
    issuer: &str,
    provider_id: &str,
    login: &str,
    expiration: Duration,
    sign_key: &[u8],
) -> TokenResult<String> {
    SignedClaims::new(issuer, login, provider_id, expiration).sign(sign_key)
}

pub fn parse_state_token(issuer: &str, token: &str, sign_key: &[u8]) -> TokenResult<StateToken> {
    let claims = SignedClaims::verify(issuer, token, sign_key)?;
    Ok(StateToken {
        provider_id: claims.sub,
        login: claims.aud,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenFault;
    use chrono::Utc;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    #[test]
    fn test_state_token() {
        let token = new_state_token("zzz", "aaa", Duration::hours(1), b"xxx").unwrap();
        assert!(!token.is_empty());

        let state = parse_state_token("zzz", &token, b"xxx").unwrap();
        assert_eq!(state.provider_id, "aaa");
        assert_eq!(state.login, "");
    }

    #[test]
    fn test_state_token_with_login() {
        let token =
            new_state_token_with_login("zzz", "aaa", "bob", Duration::hours(1), b"xxx").unwrap();

        let state = parse_state_token("zzz", &token, b"xxx").unwrap();
        assert_eq!(state.provider_id, "aaa");
        assert_eq!(state.login, "bob");
    }

    #[test]
    fn test_token_is_three_segments() {
        let token = new_state_token("zzz", "aaa", Duration::hours(1), b"xxx").unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_issuer_mismatch() {
        let token = new_state_token("zzz", "aaa", Duration::hours(1), b"xxx").unwrap();

        let err = parse_state_token("yyy", &token, b"xxx").unwrap_err();
        assert_eq!(err.fault, TokenFault::IssuerMismatch);
        assert!(!err.is_expired());
    }

    #[test]
    fn test_wrong_key() {
        let token = new_state_token("zzz", "aaa", Duration::hours(1), b"xxx").unwrap();

        let err = parse_state_token("zzz", &token, b"other").unwrap_err();
        assert_eq!(err.fault, TokenFault::BadSignature);
    }

    #[test]
    fn test_negative_expiration_is_expired() {
        let token = new_state_token("zzz", "aaa", Duration::seconds(-1), b"xxx").unwrap();

        let err = parse_state_token("zzz", &token, b"xxx").unwrap_err();
        assert!(err.is_expired());
    }

    #[test]
    fn test_token_issued_two_hours_ago_with_one_hour_expiration() {
        #[derive(serde::Serialize)]
        struct Claims {
            iss: &'static str,
            aud: &'static str,
            sub: &'static str,
            exp: i64,
        }

        let issued_at = Utc::now() - Duration::hours(2);
        let claims = Claims {
            iss: "zzz",
            aud: "",
            sub: "aaa",
            exp: (issued_at + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"xxx"),
        )
        .unwrap();

        let err = parse_state_token("zzz", &token, b"xxx").unwrap_err();
        assert_eq!(err.fault, TokenFault::Expired);
    }

    #[test]
    fn test_algorithm_mismatch() {
        let claims = SignedClaims::new("zzz", "", "aaa", Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"xxx"),
        )
        .unwrap();

        let err = parse_state_token("zzz", &token, b"xxx").unwrap_err();
        assert_eq!(err.fault, TokenFault::AlgorithmMismatch);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = parse_state_token("zzz", "not-a-token", b"xxx").unwrap_err();
        assert!(matches!(err.fault, TokenFault::Malformed(_)));
    }
}
