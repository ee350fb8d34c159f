//! In-memory user store with argon2 password hashes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use async_trait::async_trait;
use authkit_core::{OAuth2Token, StoreError, StoreResult, User, UserStore};
use rand_core::OsRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};
use tracing::debug;

/// Real Argon2 hash of "dummy_password", verified for unknown logins so that the
/// response time does not reveal whether a login exists.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$9QsJRKgzJkKaOUvlp7gl2Q$qmE3qIFBNJ6nZYbLYXEI2uo0zZc7T0Q8LU1ZsqsZ3QE";

/// Concurrent argon2 computations.
const HASH_PERMITS: usize = 5;

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    tokens: HashMap<String, OAuth2Token>,
}

#[derive(Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, StoredUser>>>,
    semaphore: Arc<Semaphore>,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            semaphore: Arc::new(Semaphore::new(HASH_PERMITS)),
        }
    }

    async fn hash_password(&self, password: &str) -> StoreResult<String> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(StoreError::backend)?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(hash.to_string())
    }

    async fn verify_password(&self, password: &str, hash: &str) -> StoreResult<bool> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(StoreError::backend)?;
        let parsed = PasswordHash::new(hash).map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    async fn insert(&self, login: &str, password: &str, disabled: bool) -> StoreResult<()> {
        if self.users.read().await.contains_key(login) {
            return Err(StoreError::DuplicateUser);
        }
        let password_hash = self.hash_password(password).await?;

        let mut users = self.users.write().await;
        // Checked again: another create may have won while hashing.
        if users.contains_key(login) {
            return Err(StoreError::DuplicateUser);
        }
        users.insert(
            login.to_string(),
            StoredUser {
                user: User {
                    login: login.to_string(),
                    email: login.contains('@').then(|| login.to_string()),
                    password_hash,
                    disabled,
                },
                tokens: HashMap::new(),
            },
        );
        debug!("Created user {} (disabled: {})", login, disabled);
        Ok(())
    }

    async fn with_user<T>(
        &self,
        login: &str,
        f: impl FnOnce(&mut StoredUser) -> T,
    ) -> StoreResult<T> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(login).ok_or(StoreError::UserNotFound)?;
        Ok(f(stored))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, login: &str, password: &str) -> StoreResult<()> {
        self.insert(login, password, true).await
    }

    async fn create_enabled(&self, login: &str, password: &str) -> StoreResult<()> {
        self.insert(login, password, false).await
    }

    async fn enable(&self, login: &str) -> StoreResult<()> {
        self.with_user(login, |stored| stored.user.disabled = false)
            .await
    }

    async fn authenticate(&self, login: &str, password: &str) -> StoreResult<()> {
        let user = self
            .users
            .read()
            .await
            .get(login)
            .map(|stored| stored.user.clone());

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(DUMMY_HASH);
        let password_valid = self.verify_password(password, hash).await?;

        match user {
            Some(user) if password_valid => {
                if user.disabled {
                    Err(StoreError::AccountDisabled)
                } else {
                    Ok(())
                }
            }
            // Same error whether the login is unknown or the password is wrong.
            _ => Err(StoreError::InvalidCredentials),
        }
    }

    async fn user(&self, login: &str) -> StoreResult<User> {
        self.users
            .read()
            .await
            .get(login)
            .map(|stored| stored.user.clone())
            .ok_or(StoreError::UserNotFound)
    }

    async fn update_password(&self, login: &str, new_password: &str) -> StoreResult<()> {
        // Fail before hashing for unknown logins.
        self.user(login).await?;
        let password_hash = self.hash_password(new_password).await?;
        self.with_user(login, |stored| stored.user.password_hash = password_hash)
            .await
    }

    async fn oauth2_token(
        &self,
        login: &str,
        provider_id: &str,
    ) -> StoreResult<Option<OAuth2Token>> {
        self.users
            .read()
            .await
            .get(login)
            .map(|stored| stored.tokens.get(provider_id).cloned())
            .ok_or(StoreError::UserNotFound)
    }

    async fn update_oauth2_token(
        &self,
        login: &str,
        provider_id: &str,
        token: &OAuth2Token,
    ) -> StoreResult<()> {
        let token = token.clone();
        self.with_user(login, |stored| {
            stored.tokens.insert(provider_id.to_string(), token);
        })
        .await
    }

    async fn revoke_access_token(&self, provider_id: &str, access_token: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        for stored in users.values_mut() {
            let matches = stored
                .tokens
                .get(provider_id)
                .is_some_and(|t| t.access_token == access_token);
            if matches {
                stored.tokens.remove(provider_id);
                debug!("Revoked {} token of {}", provider_id, stored.user.login);
            }
        }
        Ok(())
    }
}
