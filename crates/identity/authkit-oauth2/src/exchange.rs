//! Authorization code exchange.

use crate::client_cache::HttpClientCache;
use crate::config::ProviderSettings;
use crate::error::{OAuth2Error, OAuth2Result};
use async_trait::async_trait;
use authkit_core::OAuth2Token;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, error};
use url::Url;

/// The part of an OAuth2 client configuration the login flows depend on.
#[async_trait]
pub trait OAuth2ExchangeConfig: Send + Sync {
    fn settings(&self) -> &ProviderSettings;

    /// Authorization endpoint URL for a code flow carrying `state`.
    fn auth_code_url(&self, state: &str) -> OAuth2Result<String> {
        authorization_url(self.settings(), state, &[])
    }

    /// Exchanges an authorization code for a token. Single attempt; codes are single-use.
    async fn exchange(&self, code: &str) -> OAuth2Result<OAuth2Token>;

    /// HTTP client that authorizes its requests with `token`.
    fn client(&self, token: &OAuth2Token) -> AuthorizedClient;
}

/// Builds the authorization endpoint URL with the standard code-flow parameters
/// followed by `extra` parameters.
pub fn authorization_url(
    settings: &ProviderSettings,
    state: &str,
    extra: &[(&str, &str)],
) -> OAuth2Result<String> {
    let mut url = Url::parse(&settings.auth_url)?;
    {
        let mut params = url.query_pairs_mut();
        params.append_pair("client_id", &settings.client_id);
        params.append_pair("response_type", "code");
        if !settings.redirect_url.is_empty() {
            params.append_pair("redirect_uri", &settings.redirect_url);
        }
        if !settings.scopes.is_empty() {
            params.append_pair("scope", &settings.scope_string());
        }
        params.append_pair("state", state);
        for (key, value) in extra {
            params.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}

/// A reqwest client bound to an access token.
#[derive(Clone)]
pub struct AuthorizedClient {
    http: Client,
    token: OAuth2Token,
}

impl AuthorizedClient {
    pub fn new(http: Client, token: OAuth2Token) -> Self {
        Self { http, token }
    }

    pub fn token(&self) -> &OAuth2Token {
        &self.token
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(&self.token.access_token)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Fails when `expires_in` does not fit a timestamp.
    pub fn into_token(self) -> OAuth2Result<OAuth2Token> {
        let mut token = OAuth2Token::new(self.access_token);
        if let Some(token_type) = self.token_type {
            token.token_type = token_type;
        }
        if let Some(refresh_token) = self.refresh_token {
            token = token.with_refresh_token(refresh_token);
        }
        match self.expires_in {
            Some(seconds) if seconds > 0 => token.try_expires_in(seconds).ok_or_else(|| {
                OAuth2Error::InvalidTokenResponse(format!("expires_in out of range: {seconds}"))
            }),
            _ => Ok(token),
        }
    }
}

/// reqwest-backed exchange configuration for one provider.
#[derive(Clone)]
pub struct OAuth2Client {
    settings: ProviderSettings,
    http_client: Client,
}

impl OAuth2Client {
    pub fn new(settings: ProviderSettings, clients: &HttpClientCache) -> OAuth2Result<Self> {
        if settings.client_id.is_empty() {
            return Err(OAuth2Error::ConfigError(format!(
                "provider {} has no client id",
                settings.id
            )));
        }
        Url::parse(&settings.auth_url)?;
        Url::parse(&settings.token_url)?;

        let http_client = clients.client_for(&settings)?;
        Ok(Self {
            settings,
            http_client,
        })
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }
}

#[async_trait]
impl OAuth2ExchangeConfig for OAuth2Client {
    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    async fn exchange(&self, code: &str) -> OAuth2Result<OAuth2Token> {
        let mut params = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("client_id", self.settings.client_id.as_str());
        params.insert("client_secret", self.settings.client_secret.as_str());
        if !self.settings.redirect_url.is_empty() {
            params.insert("redirect_uri", self.settings.redirect_url.as_str());
        }

        let response = self
            .http_client
            .post(&self.settings.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Token exchange with {} failed ({}): {}",
                self.settings.id, status, error_text
            );
            return Err(OAuth2Error::TokenExchangeFailed(format!(
                "{status}: {error_text}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::InvalidTokenResponse(e.to_string()))?;

        let token = token_response.into_token()?;
        debug!("Exchanged authorization code with {}", self.settings.id);
        Ok(token)
    }

    fn client(&self, token: &OAuth2Token) -> AuthorizedClient {
        AuthorizedClient::new(self.http_client.clone(), token.clone())
    }
}
