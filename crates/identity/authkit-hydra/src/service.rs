use crate::consent::ConsentIssuer;
use crate::error::{ConsentError, IssueError};
use crate::issuer::{HydraTokenIssuer, TokenRevoker};
use async_trait::async_trait;
use authkit_core::{BoxError, OAuth2Token, PrivateTokenIssuer};
use std::sync::Arc;

/// Trust authority operations used by the login handlers.
#[async_trait]
pub trait AuthService: PrivateTokenIssuer {
    /// Consent token for a third-party consent page flow, bounded by `challenge`.
    async fn generate_consent_token(
        &self,
        subject: &str,
        scopes: &[String],
        challenge: &str,
    ) -> Result<String, ConsentError>;

    /// Consent token for the application's own client.
    async fn generate_consent_token_for_client(
        &self,
        subject: &str,
        scopes: &[String],
        client_id: &str,
    ) -> Result<String, ConsentError>;

    async fn revoke_access_token(&self, access_token: &str) -> Result<(), IssueError>;
}

/// [`AuthService`] backed by Hydra.
pub struct HydraAuthService {
    consent: Arc<ConsentIssuer>,
    issuer: HydraTokenIssuer,
    revoker: TokenRevoker,
}

impl HydraAuthService {
    pub fn new(consent: Arc<ConsentIssuer>, issuer: HydraTokenIssuer, revoker: TokenRevoker) -> Self {
        Self {
            consent,
            issuer,
            revoker,
        }
    }
}

#[async_trait]
impl PrivateTokenIssuer for HydraAuthService {
    async fn issue_token(&self, login: &str) -> Result<OAuth2Token, BoxError> {
        Ok(self.issuer.issue(login).await?)
    }
}

#[async_trait]
impl AuthService for HydraAuthService {
    async fn generate_consent_token(
        &self,
        subject: &str,
        scopes: &[String],
        challenge: &str,
    ) -> Result<String, ConsentError> {
        self.consent
            .generate_consent_token(subject, scopes, challenge)
            .await
    }

    async fn generate_consent_token_for_client(
        &self,
        subject: &str,
        scopes: &[String],
        client_id: &str,
    ) -> Result<String, ConsentError> {
        self.consent
            .generate_consent_token_for_client(subject, scopes, client_id)
            .await
    }

    async fn revoke_access_token(&self, access_token: &str) -> Result<(), IssueError> {
        self.revoker.revoke(access_token).await
    }
}
