//! Key retrieval from the trust authority.

use crate::config::HydraSettings;
use crate::error::KeyFetchError;
use crate::jwk::{KeySet, WebKey};
use async_trait::async_trait;
use authkit_core::OAuth2Token;
use authkit_oauth2::TokenResponse;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

/// Fetches the first key of a key set from the trust authority.
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    async fn fetch(&self, set: &str, kid: &str) -> Result<WebKey, KeyFetchError>;
}

/// Fetches keys from Hydra's `/keys/{set}/{kid}` endpoint, authorized with a
/// client-credentials token that is reused until it expires.
pub struct HydraKeyFetcher {
    settings: HydraSettings,
    http: Client,
    credentials: Mutex<Option<OAuth2Token>>,
}

impl HydraKeyFetcher {
    pub fn new(settings: HydraSettings, http: Client) -> Self {
        Self {
            settings,
            http,
            credentials: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, KeyFetchError> {
        let mut cached = self.credentials.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.access_token.clone());
        }

        let scope = self.settings.scopes.join(" ");
        let mut form = vec![("grant_type", "client_credentials")];
        if !scope.is_empty() {
            form.push(("scope", scope.as_str()));
        }

        let response = self
            .http
            .post(self.settings.token_url())
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(KeyFetchError::Credentials(format!("{status}: {text}")));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| KeyFetchError::Credentials(e.to_string()))?
            .into_token()
            .map_err(|e| KeyFetchError::Credentials(e.to_string()))?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}

#[async_trait]
impl KeyFetcher for HydraKeyFetcher {
    async fn fetch(&self, set: &str, kid: &str) -> Result<WebKey, KeyFetchError> {
        let access_token = self.access_token().await?;

        let response = self
            .http
            .get(self.settings.key_url(set, kid))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KeyFetchError::UnexpectedStatus {
                set: set.to_string(),
                kid: kid.to_string(),
                status: response.status(),
            });
        }

        let key_set: KeySet = response
            .json()
            .await
            .map_err(|e| KeyFetchError::InvalidKey(e.to_string()))?;

        debug!("Fetched key {}/{} ({} keys)", set, kid, key_set.keys.len());
        key_set
            .keys
            .into_iter()
            .next()
            .ok_or_else(|| KeyFetchError::EmptyKeySet {
                set: set.to_string(),
                kid: kid.to_string(),
            })
    }
}
