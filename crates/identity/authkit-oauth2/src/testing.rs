//! Counting collaborator fakes shared by the unit tests.

use async_trait::async_trait;
use authkit_core::{
    BoxError, Confirmer, OAuth2Token, PrivateTokenIssuer, Profile, ProfileStore, StoreError,
    StoreResult, User, UserStore,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct FakeUserStore {
    users: Mutex<HashMap<String, User>>,
    tokens: Mutex<HashMap<(String, String), OAuth2Token>>,
    pub create_calls: AtomicUsize,
    pub token_reads: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_lookup: AtomicBool,
}

impl FakeUserStore {
    pub fn insert_user(&self, login: &str) {
        self.users.lock().unwrap().insert(
            login.to_string(),
            User {
                login: login.to_string(),
                email: None,
                password_hash: "hash".to_string(),
                disabled: false,
            },
        );
    }
}

#[async_trait]
impl UserStore for FakeUserStore {
    async fn create(&self, login: &str, _password: &str) -> StoreResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(StoreError::backend("create failed"));
        }
        if self.users.lock().unwrap().contains_key(login) {
            return Err(StoreError::DuplicateUser);
        }
        self.insert_user(login);
        Ok(())
    }

    async fn create_enabled(&self, login: &str, password: &str) -> StoreResult<()> {
        self.create(login, password).await
    }

    async fn enable(&self, _login: &str) -> StoreResult<()> {
        Ok(())
    }

    async fn authenticate(&self, _login: &str, _password: &str) -> StoreResult<()> {
        Ok(())
    }

    async fn user(&self, login: &str) -> StoreResult<User> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(StoreError::backend("lookup failed"));
        }
        self.users
            .lock()
            .unwrap()
            .get(login)
            .cloned()
            .ok_or(StoreError::UserNotFound)
    }

    async fn update_password(&self, _login: &str, _new_password: &str) -> StoreResult<()> {
        Ok(())
    }

    async fn oauth2_token(
        &self,
        login: &str,
        provider_id: &str,
    ) -> StoreResult<Option<OAuth2Token>> {
        self.token_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .get(&(login.to_string(), provider_id.to_string()))
            .cloned())
    }

    async fn update_oauth2_token(
        &self,
        login: &str,
        provider_id: &str,
        token: &OAuth2Token,
    ) -> StoreResult<()> {
        self.tokens
            .lock()
            .unwrap()
            .insert((login.to_string(), provider_id.to_string()), token.clone());
        Ok(())
    }

    async fn revoke_access_token(&self, _provider_id: &str, _access_token: &str) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeProfileStore {
    profiles: Mutex<HashMap<String, Profile>>,
    pub save_calls: AtomicUsize,
    pub fail_save: AtomicBool,
}

impl FakeProfileStore {
    pub fn profile(&self, login: &str) -> Option<Profile> {
        self.profiles.lock().unwrap().get(login).cloned()
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn ensure_exists(&self, login: &str, _email: Option<&str>) -> StoreResult<()> {
        self.profiles
            .lock()
            .unwrap()
            .entry(login.to_string())
            .or_insert_with(|| Profile::new(login));
        Ok(())
    }

    async fn save(&self, profile: &Profile) -> StoreResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::backend("save failed"));
        }
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.login.clone(), profile.clone());
        Ok(())
    }

    async fn set_email_confirmed(&self, _login: &str, _email: &str, _confirmed: bool) -> StoreResult<()> {
        Ok(())
    }

    async fn email(&self, _login: &str) -> StoreResult<(String, String)> {
        Err(StoreError::UserNotFound)
    }

    async fn confirmed_email(&self, _login: &str) -> StoreResult<(String, String)> {
        Err(StoreError::UserNotFound)
    }
}

#[derive(Default)]
pub struct FakeConfirmer {
    pub email_calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl Confirmer for FakeConfirmer {
    async fn request_email_confirmation(&self, _login: &str, _email: &str, _name: &str) -> StoreResult<()> {
        self.email_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::RequestConfirmation("mailer down".into()));
        }
        Ok(())
    }

    async fn request_password_change_confirmation(
        &self,
        _login: &str,
        _email: &str,
        _name: &str,
        _password_hash: &str,
    ) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeIssuer {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl PrivateTokenIssuer for FakeIssuer {
    async fn issue_token(&self, login: &str) -> Result<OAuth2Token, BoxError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err("trust authority unavailable".into());
        }
        Ok(OAuth2Token::new(format!("private-{login}-{n}")).expires_in(3600))
    }
}
