//! In-memory profile store.

use async_trait::async_trait;
use authkit_core::{Profile, ProfileStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, Profile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn profile(&self, login: &str) -> Option<Profile> {
        self.profiles.read().await.get(login).cloned()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn ensure_exists(&self, login: &str, email: Option<&str>) -> StoreResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles.entry(login.to_string()).or_insert_with(|| {
            let profile = Profile::new(login);
            match email {
                Some(email) => profile.with_email(email),
                None => profile,
            }
        });
        Ok(())
    }

    async fn save(&self, profile: &Profile) -> StoreResult<()> {
        self.profiles
            .write()
            .await
            .insert(profile.login.clone(), profile.clone());
        Ok(())
    }

    async fn set_email_confirmed(
        &self,
        login: &str,
        email: &str,
        confirmed: bool,
    ) -> StoreResult<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(login).ok_or(StoreError::UserNotFound)?;
        profile.email = Some(email.to_string());
        profile.email_confirmed = confirmed;
        Ok(())
    }

    async fn email(&self, login: &str) -> StoreResult<(String, String)> {
        let profiles = self.profiles.read().await;
        profiles
            .get(login)
            .and_then(|p| p.email.clone().map(|email| (email, p.formatted_name.clone())))
            .ok_or(StoreError::UserNotFound)
    }

    async fn confirmed_email(&self, login: &str) -> StoreResult<(String, String)> {
        let profiles = self.profiles.read().await;
        profiles
            .get(login)
            .filter(|p| p.email_confirmed)
            .and_then(|p| p.email.clone().map(|email| (email, p.formatted_name.clone())))
            .ok_or(StoreError::UserNotFound)
    }
}
