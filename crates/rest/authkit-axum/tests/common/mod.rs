#![allow(dead_code)]

use async_trait::async_trait;
use authkit_apptoken::TokenSettings;
use authkit_axum::{AppState, DefaultErrorCustomizer, HandlerSettings, router};
use authkit_core::{
    BoxError, Confirmer, OAuth2Token, PrivateTokenIssuer, Profile, ProfileStore, StoreError,
    StoreResult, User, UserStore,
};
use authkit_hydra::{AuthService, ConsentError, IssueError};
use authkit_local::InMemoryProfileStore;
use authkit_oauth2::{
    AuthorizedClient, CallbackOrchestrator, HttpClientCache, OAuth2Client, OAuth2ExchangeConfig,
    OAuth2Provider, OAuth2Result, PrivateProvider, ProviderRegistry, ProviderSettings,
    SocialProfileRegistry, UserProvisioner,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header::CONTENT_TYPE},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

pub const PRIVATE_ID: &str = "authkit";
pub const COOKIE: &str = "X-App-Auth";

pub fn token_settings() -> TokenSettings {
    TokenSettings::new("authkit-test", b"test-sign-key".to_vec(), Duration::minutes(10))
}

pub fn mod_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[derive(Default)]
pub struct FakeUsers {
    users: Mutex<HashMap<String, (User, String)>>,
    pub create_calls: AtomicUsize,
    pub update_password_calls: AtomicUsize,
    pub revoked: Mutex<Vec<(String, String)>>,
    pub tokens: Mutex<HashMap<(String, String), OAuth2Token>>,
}

impl FakeUsers {
    pub fn insert(&self, login: &str, password: &str, disabled: bool) {
        let user = User {
            login: login.to_string(),
            email: None,
            password_hash: format!("hash:{password}"),
            disabled,
        };
        self.users
            .lock()
            .unwrap()
            .insert(login.to_string(), (user, password.to_string()));
    }

    pub fn get(&self, login: &str) -> Option<User> {
        self.users.lock().unwrap().get(login).map(|(u, _)| u.clone())
    }

    fn add(&self, login: &str, password: &str, disabled: bool) -> StoreResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.get(login).is_some() {
            return Err(StoreError::DuplicateUser);
        }
        self.insert(login, password, disabled);
        Ok(())
    }
}

#[async_trait]
impl UserStore for FakeUsers {
    async fn create(&self, login: &str, password: &str) -> StoreResult<()> {
        self.add(login, password, true)
    }

    async fn create_enabled(&self, login: &str, password: &str) -> StoreResult<()> {
        self.add(login, password, false)
    }

    async fn enable(&self, login: &str) -> StoreResult<()> {
        let mut users = self.users.lock().unwrap();
        let (user, _) = users.get_mut(login).ok_or(StoreError::UserNotFound)?;
        user.disabled = false;
        Ok(())
    }

    async fn authenticate(&self, login: &str, password: &str) -> StoreResult<()> {
        let users = self.users.lock().unwrap();
        match users.get(login) {
            Some((_, stored)) if stored != password => Err(StoreError::InvalidCredentials),
            Some((user, _)) if user.disabled => Err(StoreError::AccountDisabled),
            Some(_) => Ok(()),
            None => Err(StoreError::InvalidCredentials),
        }
    }

    async fn user(&self, login: &str) -> StoreResult<User> {
        self.get(login).ok_or(StoreError::UserNotFound)
    }

    async fn update_password(&self, login: &str, new_password: &str) -> StoreResult<()> {
        self.update_password_calls.fetch_add(1, Ordering::SeqCst);
        let disabled = self.get(login).ok_or(StoreError::UserNotFound)?.disabled;
        self.insert(login, new_password, disabled);
        Ok(())
    }

    async fn oauth2_token(
        &self,
        login: &str,
        provider_id: &str,
    ) -> StoreResult<Option<OAuth2Token>> {
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

    async fn revoke_access_token(&self, provider_id: &str, access_token: &str) -> StoreResult<()> {
        self.revoked
            .lock()
            .unwrap()
            .push((provider_id.to_string(), access_token.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Email {
        login: String,
        email: String,
    },
    PasswordChange {
        login: String,
        email: String,
        password_hash: String,
    },
}

#[derive(Default)]
pub struct FakeConfirmer {
    pub sent: Mutex<Vec<Confirmation>>,
}

#[async_trait]
impl Confirmer for FakeConfirmer {
    async fn request_email_confirmation(
        &self,
        login: &str,
        email: &str,
        _name: &str,
    ) -> StoreResult<()> {
        self.sent.lock().unwrap().push(Confirmation::Email {
            login: login.to_string(),
            email: email.to_string(),
        });
        Ok(())
    }

    async fn request_password_change_confirmation(
        &self,
        login: &str,
        email: &str,
        _name: &str,
        password_hash: &str,
    ) -> StoreResult<()> {
        self.sent.lock().unwrap().push(Confirmation::PasswordChange {
            login: login.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        });
        Ok(())
    }
}

/// Consent tokens are `consent:{subject}:{scopes}`; the scope `admin` is never granted.
#[derive(Default)]
pub struct FakeAuth {
    pub issued: AtomicUsize,
    pub revoked: Mutex<Vec<String>>,
}

#[async_trait]
impl PrivateTokenIssuer for FakeAuth {
    async fn issue_token(&self, login: &str) -> Result<OAuth2Token, BoxError> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(OAuth2Token::new(format!("minted-{login}")).expires_in(3600))
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn generate_consent_token(
        &self,
        subject: &str,
        scopes: &[String],
        _challenge: &str,
    ) -> Result<String, ConsentError> {
        if scopes.iter().any(|s| s == "admin") {
            return Err(ConsentError::ScopeEscalation {
                scope: "admin".to_string(),
            });
        }
        Ok(format!("consent:{}:{}", subject, scopes.join(" ")))
    }

    async fn generate_consent_token_for_client(
        &self,
        subject: &str,
        scopes: &[String],
        _client_id: &str,
    ) -> Result<String, ConsentError> {
        Ok(format!("consent:{}:{}", subject, scopes.join(" ")))
    }

    async fn revoke_access_token(&self, access_token: &str) -> Result<(), IssueError> {
        self.revoked.lock().unwrap().push(access_token.to_string());
        Ok(())
    }
}

/// Exchange config that hands out `token` for any code.
pub struct FakeExchange {
    settings: ProviderSettings,
    token: String,
    pub exchanges: AtomicUsize,
}

impl FakeExchange {
    pub fn new(settings: ProviderSettings, token: &str) -> Self {
        Self {
            settings,
            token: token.to_string(),
            exchanges: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OAuth2ExchangeConfig for FakeExchange {
    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    async fn exchange(&self, _code: &str) -> OAuth2Result<OAuth2Token> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        Ok(OAuth2Token::new(self.token.clone()).expires_in(3600))
    }

    fn client(&self, token: &OAuth2Token) -> AuthorizedClient {
        AuthorizedClient::new(reqwest::Client::new(), token.clone())
    }
}

pub fn private_settings(auth_url: &str) -> ProviderSettings {
    ProviderSettings::new(PRIVATE_ID, "authkit-client", auth_url, "https://auth.example.com/oauth2/token")
        .with_scopes(["openid", "offline"])
}

pub struct Harness {
    pub users: Arc<FakeUsers>,
    pub profiles: Arc<InMemoryProfileStore>,
    pub confirmer: Arc<FakeConfirmer>,
    pub auth: Arc<FakeAuth>,
    pub private_exchange: Arc<FakeExchange>,
    pub app: Router,
}

impl Harness {
    pub fn new() -> Self {
        let users = Arc::new(FakeUsers::default());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let confirmer = Arc::new(FakeConfirmer::default());
        let auth = Arc::new(FakeAuth::default());

        let clients = HttpClientCache::new();
        let public: Arc<dyn OAuth2ExchangeConfig> = Arc::new(
            OAuth2Client::new(private_settings("https://auth.example.com/oauth2/auth"), &clients)
                .unwrap(),
        );
        let private_exchange = Arc::new(FakeExchange::new(
            private_settings("http://hydra.internal/oauth2/auth"),
            "private-access-token",
        ));
        let google = ProviderSettings::new(
            "google",
            "google-client",
            "https://accounts.google.com/o/oauth2/auth",
            "https://oauth2.googleapis.com/token",
        )
        .with_display("Google", "/img/google.png")
        .with_redirect_url("https://app.example.com/callback")
        .with_scopes(["email", "profile"]);
        let google = OAuth2Provider::new(Arc::new(OAuth2Client::new(google, &clients).unwrap()));

        let registry = ProviderRegistry::new(
            PrivateProvider::new(public, private_exchange.clone()),
            vec![google],
        );

        let provisioner = Arc::new(UserProvisioner::new(
            users.clone(),
            profiles.clone(),
            confirmer.clone(),
            auth.clone(),
            PRIVATE_ID,
        ));
        let callback = Arc::new(CallbackOrchestrator::new(
            token_settings(),
            registry.clone(),
            SocialProfileRegistry::new(),
            users.clone(),
            provisioner,
        ));

        let state = AppState {
            settings: Arc::new(HandlerSettings {
                auth_cookie_name: COOKIE.to_string(),
                state: token_settings(),
                mod_time: mod_time(),
            }),
            providers: registry,
            callback,
            auth: auth.clone(),
            users: users.clone(),
            profiles: profiles.clone(),
            confirmer: confirmer.clone(),
            errors: Arc::new(DefaultErrorCustomizer),
        };

        Self {
            users,
            profiles,
            confirmer,
            auth,
            private_exchange,
            app: router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn profile(&self, login: &str) -> Option<Profile> {
        self.profiles.profile(login).await
    }

    pub async fn save_profile(&self, profile: Profile) {
        self.profiles.save(&profile).await.unwrap();
    }
}

pub fn form_post(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    Request::post(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn multipart_post(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    const BOUNDARY: &str = "authkit-test-boundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::post(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
