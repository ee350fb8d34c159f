//! OAuth2 provider configuration types.

use serde::{Deserialize, Serialize};

/// Settings of one OAuth2 provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon_url: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Accept invalid TLS certificates, for providers reached over a private network.
    #[serde(default)]
    pub tls_skip_verify: bool,
}

impl ProviderSettings {
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            icon_url: String::new(),
            client_id: client_id.into(),
            client_secret: String::new(),
            auth_url: auth_url.into(),
            token_url: token_url.into(),
            redirect_url: String::new(),
            scopes: Vec::new(),
            tls_skip_verify: false,
        }
    }

    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = client_secret.into();
        self
    }

    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = redirect_url.into();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_display(mut self, name: impl Into<String>, icon_url: impl Into<String>) -> Self {
        self.name = name.into();
        self.icon_url = icon_url.into();
        self
    }

    pub fn with_tls_skip_verify(mut self, tls_skip_verify: bool) -> Self {
        self.tls_skip_verify = tls_skip_verify;
        self
    }

    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}
