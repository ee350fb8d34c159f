//! Consent challenge verification and consent token signing.

use crate::cache::KeyCache;
use crate::error::ConsentError;
use authkit_apptoken::InvalidToken;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Claims of a consent challenge and of the consent token derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentClaims {
    /// Client id.
    #[serde(default)]
    pub aud: String,
    pub exp: i64,
    /// User login.
    #[serde(default)]
    pub sub: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scp: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Issues consent tokens signed with the trust authority's response key.
pub struct ConsentIssuer {
    keys: Arc<KeyCache>,
    challenge_lifespan: Duration,
}

impl ConsentIssuer {
    pub fn new(keys: Arc<KeyCache>, challenge_lifespan: Duration) -> Self {
        Self {
            keys,
            challenge_lifespan,
        }
    }

    /// Checks the challenge signature and expiry. Audience and issuer are not checked.
    pub async fn verify_challenge(&self, challenge: &str) -> Result<ConsentClaims, ConsentError> {
        let key = self.keys.consent_challenge_public_key().await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        decode::<ConsentClaims>(challenge, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| ConsentError::InvalidChallenge(InvalidToken::from(e)))
    }

    /// Derives a consent token from `challenge` for `subject`.
    ///
    /// Every requested scope must be granted by the challenge; the token keeps the
    /// challenge's audience and expiry and carries only the requested scopes.
    pub async fn generate_consent_token(
        &self,
        subject: &str,
        scopes: &[String],
        challenge: &str,
    ) -> Result<String, ConsentError> {
        let challenge = self.verify_challenge(challenge).await?;

        let granted: HashSet<&str> = challenge.scp.iter().map(String::as_str).collect();
        if let Some(scope) = scopes.iter().find(|s| !granted.contains(s.as_str())) {
            return Err(ConsentError::ScopeEscalation {
                scope: scope.clone(),
            });
        }

        self.sign(&ConsentClaims {
            aud: challenge.aud,
            exp: challenge.exp,
            sub: subject.to_string(),
            scp: scopes.to_vec(),
            redir: None,
            jti: None,
        })
        .await
    }

    /// Issues a consent token for a first-party client without a challenge.
    pub async fn generate_consent_token_for_client(
        &self,
        subject: &str,
        scopes: &[String],
        client_id: &str,
    ) -> Result<String, ConsentError> {
        let exp = Utc::now()
            .checked_add_signed(self.challenge_lifespan)
            .ok_or(ConsentError::ExpiryOutOfRange)?;
        self.sign(&ConsentClaims {
            aud: client_id.to_string(),
            exp: exp.timestamp(),
            sub: subject.to_string(),
            scp: scopes.to_vec(),
            redir: None,
            jti: Some(Uuid::new_v4().to_string()),
        })
        .await
    }

    async fn sign(&self, claims: &ConsentClaims) -> Result<String, ConsentError> {
        let key = self.keys.consent_response_private_key().await?;
        encode(&Header::new(Algorithm::RS256), claims, &key).map_err(ConsentError::Signing)
    }
}
