//! Private provider token minting and revocation.

use crate::config::HydraSettings;
use crate::consent::ConsentIssuer;
use crate::error::IssueError;
use authkit_apptoken::TokenSettings;
use authkit_core::OAuth2Token;
use authkit_oauth2::{OAuth2ExchangeConfig, authorization_url};
use reqwest::{Client, StatusCode, header::LOCATION, redirect::Policy};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Mints private provider tokens for users that are already authenticated.
///
/// Performs the same code flow a browser would after a first-party login: a
/// consent token for the private client and a state token carrying the login go
/// to the authorization endpoint, whose `302` redirect carries the code that is
/// then exchanged. Tokens minted this way are indistinguishable from tokens
/// obtained through direct login.
pub struct HydraTokenIssuer {
    consent: Arc<ConsentIssuer>,
    state: TokenSettings,
    config: Arc<dyn OAuth2ExchangeConfig>,
    http: Client,
}

impl HydraTokenIssuer {
    /// `config` is the private provider's configuration reachable from the server.
    pub fn new(
        consent: Arc<ConsentIssuer>,
        state: TokenSettings,
        config: Arc<dyn OAuth2ExchangeConfig>,
    ) -> Result<Self, IssueError> {
        let http = Client::builder()
            .redirect(Policy::none())
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(config.settings().tls_skip_verify)
            .build()?;
        Ok(Self {
            consent,
            state,
            config,
            http,
        })
    }

    pub async fn issue(&self, login: &str) -> Result<OAuth2Token, IssueError> {
        let settings = self.config.settings();
        let consent = self
            .consent
            .generate_consent_token_for_client(login, &settings.scopes, &settings.client_id)
            .await?;
        let state = self.state.new_state_token_with_login(&settings.id, login)?;
        let url = authorization_url(settings, &state, &[("consent", consent.as_str())])?;

        let response = self.http.get(&url).send().await?;
        if response.status() != StatusCode::FOUND {
            return Err(IssueError::UnexpectedStatus(response.status()));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(IssueError::MissingCode)?;
        // Location may be relative to the authorization endpoint.
        let redirect = Url::parse(&url)?.join(location)?;
        let code = redirect
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .filter(|code| !code.is_empty())
            .ok_or(IssueError::MissingCode)?;

        debug!("Obtained authorization code for {}", login);
        Ok(self.config.exchange(&code).await?)
    }
}

/// Revokes access tokens at the trust authority (RFC 7009).
pub struct TokenRevoker {
    settings: HydraSettings,
    http: Client,
}

impl TokenRevoker {
    pub fn new(settings: HydraSettings, http: Client) -> Self {
        Self { settings, http }
    }

    pub async fn revoke(&self, access_token: &str) -> Result<(), IssueError> {
        let response = self
            .http
            .post(self.settings.revoke_url())
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[("token", access_token), ("token_type_hint", "access_token")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IssueError::UnexpectedStatus(response.status()));
        }
        Ok(())
    }
}
