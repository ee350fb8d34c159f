//! User store and related collaborator traits.

use crate::error::{BoxError, StoreResult};
use crate::token::OAuth2Token;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Basic information about a user, as required by the login logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub disabled: bool,
}

impl User {
    pub fn login(&self) -> &str {
        &self.login
    }
}

/// Persists users and their OAuth2 tokens (one token per user and provider).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a new disabled user.
    async fn create(&self, login: &str, password: &str) -> StoreResult<()>;

    /// Creates a new enabled user.
    async fn create_enabled(&self, login: &str, password: &str) -> StoreResult<()>;

    async fn enable(&self, login: &str) -> StoreResult<()>;

    /// Succeeds if the account exists, is enabled and the password matches.
    async fn authenticate(&self, login: &str, password: &str) -> StoreResult<()>;

    /// Returns `StoreError::UserNotFound` for unknown logins.
    async fn user(&self, login: &str) -> StoreResult<User>;

    async fn update_password(&self, login: &str, new_password: &str) -> StoreResult<()>;

    /// Returns `Ok(None)` when the user exists but holds no token for the provider.
    async fn oauth2_token(&self, login: &str, provider_id: &str)
    -> StoreResult<Option<OAuth2Token>>;

    /// Saves or replaces the token of the user for the provider.
    async fn update_oauth2_token(
        &self,
        login: &str,
        provider_id: &str,
        token: &OAuth2Token,
    ) -> StoreResult<()>;

    /// Informs the store that an access token was revoked.
    async fn revoke_access_token(&self, provider_id: &str, access_token: &str) -> StoreResult<()>;
}

/// Sends confirmation requests (email confirmation, password change).
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn request_email_confirmation(
        &self,
        login: &str,
        email: &str,
        name: &str,
    ) -> StoreResult<()>;

    /// `password_hash` is the current hash; it travels inside the confirmation link
    /// so that the link stops working once the password changes.
    async fn request_password_change_confirmation(
        &self,
        login: &str,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> StoreResult<()>;
}

/// Mints tokens of the application's own (private) OAuth2 provider for a user that
/// has already been authenticated by other means.
#[async_trait]
pub trait PrivateTokenIssuer: Send + Sync {
    async fn issue_token(&self, login: &str) -> Result<OAuth2Token, BoxError>;
}
