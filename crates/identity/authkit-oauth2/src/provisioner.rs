//! Internal users for external identities.

use crate::error::ProvisioningError;
use authkit_core::{
    Confirmer, OAuth2Token, PrivateTokenIssuer, Profile, ProfileStore, UserStore,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;
use tracing::{debug, info};

const RANDOM_PASSWORD_BYTES: usize = 20;

/// Reconciles external identities with the internal user store and keeps the
/// private provider's token of each user current.
pub struct UserProvisioner {
    users: Arc<dyn UserStore>,
    profiles: Arc<dyn ProfileStore>,
    confirmer: Arc<dyn Confirmer>,
    token_issuer: Arc<dyn PrivateTokenIssuer>,
    private_provider_id: String,
}

impl UserProvisioner {
    pub fn new(
        users: Arc<dyn UserStore>,
        profiles: Arc<dyn ProfileStore>,
        confirmer: Arc<dyn Confirmer>,
        token_issuer: Arc<dyn PrivateTokenIssuer>,
        private_provider_id: impl Into<String>,
    ) -> Self {
        Self {
            users,
            profiles,
            confirmer,
            token_issuer,
            private_provider_id: private_provider_id.into(),
        }
    }

    pub fn private_provider_id(&self) -> &str {
        &self.private_provider_id
    }

    /// Creates the internal user for `login` unless it exists.
    ///
    /// Returns `true` when the user was created by this call. A fresh user gets a
    /// long random password, the fetched profile, and an email confirmation request.
    pub async fn ensure_internal_user(
        &self,
        login: &str,
        profile: &Profile,
    ) -> Result<bool, ProvisioningError> {
        match self.users.user(login).await {
            Ok(_) => return Ok(false),
            Err(e) if e.is_user_not_found() => {}
            Err(source) => {
                return Err(ProvisioningError::LookupUser {
                    login: login.to_string(),
                    source,
                });
            }
        }

        let password = random_password()?;
        match self.users.create(login, &password).await {
            Ok(()) => {}
            // Created concurrently by another callback for the same identity.
            Err(e) if e.is_duplicate_user() => {
                debug!("User {} already created concurrently", login);
                return Ok(false);
            }
            Err(source) => {
                return Err(ProvisioningError::CreateUser {
                    login: login.to_string(),
                    source,
                });
            }
        }

        self.profiles
            .save(profile)
            .await
            .map_err(|source| ProvisioningError::SaveProfile {
                login: login.to_string(),
                source,
            })?;

        if let Some(email) = profile.email.as_deref().filter(|e| !e.is_empty()) {
            if let Err(e) = self
                .confirmer
                .request_email_confirmation(login, email, &profile.formatted_name)
                .await
            {
                debug!("Email confirmation request for {} failed: {}", login, e);
            }
        }

        info!("Provisioned internal user {}", login);
        Ok(true)
    }

    /// Saves the token a provider issued for `login`.
    pub async fn store_token(
        &self,
        login: &str,
        provider_id: &str,
        token: &OAuth2Token,
    ) -> Result<(), ProvisioningError> {
        self.users
            .update_oauth2_token(login, provider_id, token)
            .await
            .map_err(|source| ProvisioningError::StoreToken {
                login: login.to_string(),
                provider_id: provider_id.to_string(),
                source,
            })
    }

    /// Returns a valid private provider token for `login`.
    ///
    /// A fresh user always gets a newly minted token. Otherwise the stored token is
    /// reused while it is valid, and a new one is minted only when it is absent or
    /// expired. A minted token is persisted before it is returned.
    pub async fn issue_or_refresh_private_token(
        &self,
        login: &str,
        fresh_user: bool,
    ) -> Result<OAuth2Token, ProvisioningError> {
        if !fresh_user {
            let stored = self
                .users
                .oauth2_token(login, &self.private_provider_id)
                .await
                .map_err(|source| ProvisioningError::LoadToken {
                    login: login.to_string(),
                    provider_id: self.private_provider_id.clone(),
                    source,
                })?;
            if let Some(token) = stored.filter(OAuth2Token::is_valid) {
                debug!("Reusing stored private token of {}", login);
                return Ok(token);
            }
        }

        let token = self
            .token_issuer
            .issue_token(login)
            .await
            .map_err(|source| ProvisioningError::Mint {
                login: login.to_string(),
                source,
            })?;
        self.store_token(login, &self.private_provider_id, &token)
            .await?;
        Ok(token)
    }
}

/// Long random password for users that only log in through external providers.
fn random_password() -> Result<String, ProvisioningError> {
    let mut bytes = [0u8; RANDOM_PASSWORD_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(ProvisioningError::RandomPassword)?;
    Ok(STANDARD.encode(bytes))
}
