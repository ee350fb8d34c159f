use chrono::Duration;
use serde::{Deserialize, Serialize};

fn default_challenge_lifespan_seconds() -> i64 {
    600
}

/// Connection settings for the Hydra trust authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydraSettings {
    /// Base URL, reachable from the server.
    pub url: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Client-credentials token endpoint; defaults to `{url}/oauth2/token`.
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default = "default_challenge_lifespan_seconds")]
    pub challenge_lifespan_seconds: i64,
    #[serde(default)]
    pub tls_skip_verify: bool,
}

impl HydraSettings {
    pub fn new(
        url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: None,
            scopes: Vec::new(),
            challenge_lifespan_seconds: default_challenge_lifespan_seconds(),
            tls_skip_verify: false,
        }
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn token_url(&self) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| format!("{}/oauth2/token", self.base()))
    }

    pub fn revoke_url(&self) -> String {
        format!("{}/oauth2/revoke", self.base())
    }

    pub fn key_url(&self, set: &str, kid: &str) -> String {
        format!("{}/keys/{}/{}", self.base(), set, kid)
    }

    /// Saturates at `Duration::MAX`; an unusable lifespan fails when a consent is issued.
    pub fn challenge_lifespan(&self) -> Duration {
        Duration::try_seconds(self.challenge_lifespan_seconds).unwrap_or(Duration::MAX)
    }
}
