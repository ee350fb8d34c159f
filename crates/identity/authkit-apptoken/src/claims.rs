use crate::error::{InvalidToken, TokenFault, TokenResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SignedClaims {
    pub iss: String,
    #[serde(default)]
    pub aud: String,
    #[serde(default)]
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eml: Option<String>,
}

impl SignedClaims {
    pub fn new(issuer: &str, audience: &str, subject: &str, expiration: Duration) -> Self {
        Self {
            iss: issuer.to_string(),
            aud: audience.to_string(),
            sub: subject.to_string(),
            exp: (Utc::now() + expiration).timestamp(),
            eml: None,
        }
    }

    pub fn sign(&self, sign_key: &[u8]) -> TokenResult<String> {
        if sign_key.is_empty() {
            return Err(InvalidToken::new(TokenFault::Malformed(
                "empty sign key".to_string(),
            )));
        }
        Ok(encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(sign_key),
        )?)
    }

    pub fn verify(issuer: &str, token: &str, sign_key: &[u8]) -> TokenResult<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let data = decode::<SignedClaims>(token, &DecodingKey::from_secret(sign_key), &validation)?;
        Ok(data.claims)
    }
}
