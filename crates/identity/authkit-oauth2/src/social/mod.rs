//! Social profile retrieval from external providers.

mod facebook;
mod google;

pub use facebook::FacebookProfileFetcher;
pub use google::GoogleProfileFetcher;

use crate::error::{OAuth2Error, OAuth2Result};
use crate::exchange::AuthorizedClient;
use async_trait::async_trait;
use authkit_core::Profile;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Fetches the profile of the user an access token belongs to.
///
/// The returned profile's login is the key under which the internal user is
/// provisioned (the email address for the bundled fetchers).
#[async_trait]
pub trait SocialProfileFetcher: Send + Sync {
    async fn fetch(&self, client: &AuthorizedClient) -> OAuth2Result<Profile>;
}

/// Social profile fetchers keyed by provider id.
#[derive(Clone, Default)]
pub struct SocialProfileRegistry {
    fetchers: HashMap<String, Arc<dyn SocialProfileFetcher>>,
}

impl SocialProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        provider_id: impl Into<String>,
        fetcher: Arc<dyn SocialProfileFetcher>,
    ) -> Self {
        self.fetchers.insert(provider_id.into(), fetcher);
        self
    }

    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn SocialProfileFetcher>> {
        self.fetchers.get(provider_id).cloned()
    }
}

async fn get_json<T: DeserializeOwned>(client: &AuthorizedClient, url: &str) -> OAuth2Result<T> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() && body.is_empty() {
        return Err(OAuth2Error::ProfileRequestFailed(status.to_string()));
    }
    serde_json::from_str(&body).map_err(|e| OAuth2Error::InvalidProfileResponse(e.to_string()))
}

fn login_from_email(email: &str) -> OAuth2Result<String> {
    if email.is_empty() {
        return Err(OAuth2Error::InvalidProfileResponse(
            "profile has no email address".to_string(),
        ));
    }
    Ok(email.to_string())
}
