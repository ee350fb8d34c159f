//! OAuth2 redirect endpoint logic.
//!
//! A callback moves through `received -> validated -> exchanged` and then into
//! either the trusted branch (the application's own provider) or the external
//! branch (a third-party provider, which provisions the internal user). Every
//! step is a single attempt; failures are returned to the HTTP layer.

use crate::error::{CallbackError, OAuth2Error};
use crate::exchange::OAuth2ExchangeConfig;
use crate::provider::ProviderRegistry;
use crate::provisioner::UserProvisioner;
use crate::social::SocialProfileRegistry;
use authkit_apptoken::{StateToken, TokenSettings};
use authkit_core::{OAuth2Token, UserStore};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Query parameters of the redirect endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
}

/// Result of a completed callback: the private access token to hand to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub login: String,
    pub provider_id: String,
    pub access_token: String,
    /// True when the callback provisioned a new internal user.
    pub fresh_user: bool,
}

pub struct CallbackOrchestrator {
    state: TokenSettings,
    providers: ProviderRegistry,
    social_profiles: SocialProfileRegistry,
    users: Arc<dyn UserStore>,
    provisioner: Arc<UserProvisioner>,
}

impl CallbackOrchestrator {
    pub fn new(
        state: TokenSettings,
        providers: ProviderRegistry,
        social_profiles: SocialProfileRegistry,
        users: Arc<dyn UserStore>,
        provisioner: Arc<UserProvisioner>,
    ) -> Self {
        Self {
            state,
            providers,
            social_profiles,
            users,
            provisioner,
        }
    }

    pub async fn handle(&self, params: &CallbackParams) -> Result<CallbackOutcome, CallbackError> {
        if !params.error.is_empty() {
            return Err(CallbackError::ProviderReported {
                error: params.error.clone(),
                description: params.error_description.clone(),
            });
        }
        if params.state.is_empty() {
            return Err(CallbackError::MissingParameter("state"));
        }
        if params.code.is_empty() {
            return Err(CallbackError::MissingParameter("code"));
        }

        let state = self.state.parse_state_token(&params.state)?;
        let provider_id = state.provider_id.clone();

        let config = self
            .providers
            .exchange_config(&provider_id)
            .ok_or_else(|| CallbackError::UnknownProvider(provider_id.clone()))?;

        let token = config
            .exchange(&params.code)
            .await
            .map_err(|source| CallbackError::Exchange {
                provider_id: provider_id.clone(),
                source,
            })?;

        if self.providers.is_private(&provider_id) {
            self.handle_private_provider(state, token).await
        } else {
            self.handle_external_provider(&provider_id, config.as_ref(), token)
                .await
        }
    }

    async fn handle_private_provider(
        &self,
        state: StateToken,
        token: OAuth2Token,
    ) -> Result<CallbackOutcome, CallbackError> {
        // First-party login always embeds the login in the state.
        if state.login.is_empty() {
            return Err(CallbackError::IllegalState("empty login in private provider state"));
        }

        self.store_token(&state.login, &state.provider_id, &token)
            .await?;

        info!("Completed private provider login for {}", state.login);
        Ok(CallbackOutcome {
            login: state.login,
            provider_id: state.provider_id,
            access_token: token.access_token,
            fresh_user: false,
        })
    }

    async fn handle_external_provider(
        &self,
        provider_id: &str,
        config: &dyn OAuth2ExchangeConfig,
        token: OAuth2Token,
    ) -> Result<CallbackOutcome, CallbackError> {
        let fetcher = self.social_profiles.get(provider_id).ok_or_else(|| {
            CallbackError::SocialProfile {
                provider_id: provider_id.to_string(),
                source: OAuth2Error::ConfigError("no social profile fetcher registered".to_string()),
            }
        })?;

        let client = config.client(&token);
        let profile = fetcher
            .fetch(&client)
            .await
            .map_err(|source| CallbackError::SocialProfile {
                provider_id: provider_id.to_string(),
                source,
            })?;
        let login = profile.login.clone();
        debug!("Fetched {} profile for {}", provider_id, login);

        let fresh_user = self
            .provisioner
            .ensure_internal_user(&login, &profile)
            .await?;

        self.store_token(&login, provider_id, &token).await?;

        let private_token = self
            .provisioner
            .issue_or_refresh_private_token(&login, fresh_user)
            .await?;

        info!("Completed {} login for {} (fresh: {})", provider_id, login, fresh_user);
        Ok(CallbackOutcome {
            login,
            provider_id: provider_id.to_string(),
            access_token: private_token.access_token,
            fresh_user,
        })
    }

    async fn store_token(
        &self,
        login: &str,
        provider_id: &str,
        token: &OAuth2Token,
    ) -> Result<(), CallbackError> {
        self.users
            .update_oauth2_token(login, provider_id, token)
            .await
            .map_err(|source| CallbackError::Store {
                login: login.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;
    use crate::error::OAuth2Result;
    use crate::exchange::AuthorizedClient;
    use crate::provider::{OAuth2Provider, PrivateProvider};
    use crate::social::SocialProfileFetcher;
    use crate::testing::{FakeConfirmer, FakeIssuer, FakeProfileStore, FakeUserStore};
    use async_trait::async_trait;
    use authkit_apptoken::{TokenFault, new_state_token};
    use authkit_core::Profile;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeExchange {
        settings: ProviderSettings,
        calls: AtomicUsize,
    }

    impl FakeExchange {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                settings: ProviderSettings::new(
                    id,
                    "cid",
                    format!("https://{id}.example.com/auth"),
                    format!("https://{id}.example.com/token"),
                ),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl OAuth2ExchangeConfig for FakeExchange {
        fn settings(&self) -> &ProviderSettings {
            &self.settings
        }

        async fn exchange(&self, code: &str) -> OAuth2Result<OAuth2Token> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if code == "bad" {
                return Err(OAuth2Error::TokenExchangeFailed("invalid_grant".to_string()));
            }
            Ok(OAuth2Token::new(format!("{}-{}", self.settings.id, code)).expires_in(3600))
        }

        fn client(&self, token: &OAuth2Token) -> AuthorizedClient {
            AuthorizedClient::new(reqwest::Client::new(), token.clone())
        }
    }

    struct FakeFetcher;

    #[async_trait]
    impl SocialProfileFetcher for FakeFetcher {
        async fn fetch(&self, client: &AuthorizedClient) -> OAuth2Result<Profile> {
            assert!(client.token().access_token.starts_with("google-"));
            Ok(Profile::new("alice@example.com")
                .with_email("alice@example.com")
                .with_name("Alice"))
        }
    }

    struct Fixture {
        orchestrator: CallbackOrchestrator,
        settings: TokenSettings,
        users: Arc<FakeUserStore>,
        profiles: Arc<FakeProfileStore>,
        issuer: Arc<FakeIssuer>,
        private_exchange: Arc<FakeExchange>,
        google_exchange: Arc<FakeExchange>,
    }

    fn fixture() -> Fixture {
        let settings = TokenSettings::new("zzz", "xxx", Duration::hours(1));
        let users = Arc::new(FakeUserStore::default());
        let profiles = Arc::new(FakeProfileStore::default());
        let issuer = Arc::new(FakeIssuer::default());
        let private_exchange = FakeExchange::new("authkit");
        let google_exchange = FakeExchange::new("google");

        let providers = ProviderRegistry::new(
            PrivateProvider::new(FakeExchange::new("authkit"), private_exchange.clone()),
            vec![OAuth2Provider::new(google_exchange.clone())],
        );
        let social = SocialProfileRegistry::new().register("google", Arc::new(FakeFetcher));
        let provisioner = Arc::new(UserProvisioner::new(
            users.clone(),
            profiles.clone(),
            Arc::new(FakeConfirmer::default()),
            issuer.clone(),
            "authkit",
        ));

        Fixture {
            orchestrator: CallbackOrchestrator::new(
                settings.clone(),
                providers,
                social,
                users.clone(),
                provisioner,
            ),
            settings,
            users,
            profiles,
            issuer,
            private_exchange,
            google_exchange,
        }
    }

    fn params(state: &str, code: &str) -> CallbackParams {
        CallbackParams {
            state: state.to_string(),
            code: code.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_provider_reported_error_fails_before_state_parsing() {
        let f = fixture();
        let params = CallbackParams {
            error: "access_denied".to_string(),
            error_description: "user declined".to_string(),
            state: "garbage".to_string(),
            ..Default::default()
        };

        let err = f.orchestrator.handle(&params).await.unwrap_err();

        match err {
            CallbackError::ProviderReported { error, description } => {
                assert_eq!(error, "access_denied");
                assert_eq!(description, "user declined");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.google_exchange.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.private_exchange.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_code() {
        let f = fixture();
        let state = f.settings.new_state_token("google").unwrap();

        let err = f.orchestrator.handle(&params(&state, "")).await.unwrap_err();
        assert!(matches!(err, CallbackError::MissingParameter("code")));
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let f = fixture();
        let state = f.settings.new_state_token("ghost").unwrap();

        let err = f.orchestrator.handle(&params(&state, "c1")).await.unwrap_err();
        match err {
            CallbackError::UnknownProvider(id) => assert_eq!(id, "ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_expired_state() {
        let f = fixture();
        let state = new_state_token("zzz", "google", Duration::hours(-1), b"xxx").unwrap();

        let err = f.orchestrator.handle(&params(&state, "c1")).await.unwrap_err();
        match err {
            CallbackError::InvalidState(e) => assert_eq!(e.fault, TokenFault::Expired),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.google_exchange.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exchange_failure_is_surfaced() {
        let f = fixture();
        let state = f.settings.new_state_token("google").unwrap();

        let err = f.orchestrator.handle(&params(&state, "bad")).await.unwrap_err();
        assert!(matches!(err, CallbackError::Exchange { .. }));
        assert_eq!(f.google_exchange.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_private_provider_stores_token() {
        let f = fixture();
        let state = f
            .settings
            .new_state_token_with_login("authkit", "bob")
            .unwrap();

        let outcome = f.orchestrator.handle(&params(&state, "c1")).await.unwrap();

        assert_eq!(outcome.access_token, "authkit-c1");
        assert_eq!(outcome.login, "bob");
        assert_eq!(f.private_exchange.calls.load(Ordering::SeqCst), 1);
        let stored = f.users.oauth2_token("bob", "authkit").await.unwrap().unwrap();
        assert_eq!(stored.access_token, "authkit-c1");
        assert_eq!(f.issuer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_private_provider_without_login_is_illegal() {
        let f = fixture();
        let state = f.settings.new_state_token("authkit").unwrap();

        let err = f.orchestrator.handle(&params(&state, "c1")).await.unwrap_err();
        assert!(matches!(err, CallbackError::IllegalState(_)));
    }

    #[tokio::test]
    async fn test_external_provider_provisions_once() {
        let f = fixture();

        let state = f.settings.new_state_token("google").unwrap();
        let first = f.orchestrator.handle(&params(&state, "c1")).await.unwrap();
        assert!(first.fresh_user);
        assert_eq!(first.login, "alice@example.com");

        let state = f.settings.new_state_token("google").unwrap();
        let second = f.orchestrator.handle(&params(&state, "c2")).await.unwrap();
        assert!(!second.fresh_user);

        assert_eq!(f.users.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.profiles.save_calls.load(Ordering::SeqCst), 1);
        // The private token minted on the first visit is still valid on the second.
        assert_eq!(f.issuer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.access_token, second.access_token);

        let google = f
            .users
            .oauth2_token("alice@example.com", "google")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(google.access_token, "google-c2");
        assert!(f.profiles.profile("alice@example.com").is_some());
    }

    #[tokio::test]
    async fn test_state_issued_with_other_key_is_rejected() {
        let f = fixture();
        let other = TokenSettings::new("zzz", "yyy", Duration::hours(1));
        let state = other.new_state_token("google").unwrap();

        let err = f.orchestrator.handle(&params(&state, "c1")).await.unwrap_err();
        assert!(matches!(err, CallbackError::InvalidState(_)));
    }
}
