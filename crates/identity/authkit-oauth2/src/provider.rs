//! Registered OAuth2 providers.

use crate::exchange::OAuth2ExchangeConfig;
use std::sync::Arc;

/// A third-party OAuth2 provider users can log in with.
#[derive(Clone)]
pub struct OAuth2Provider {
    pub id: String,
    pub name: String,
    pub icon_url: String,
    pub config: Arc<dyn OAuth2ExchangeConfig>,
}

impl OAuth2Provider {
    pub fn new(config: Arc<dyn OAuth2ExchangeConfig>) -> Self {
        let settings = config.settings();
        Self {
            id: settings.id.clone(),
            name: settings.name.clone(),
            icon_url: settings.icon_url.clone(),
            config,
        }
    }
}

/// The application's own OAuth2 provider.
///
/// `config` points at the URLs browsers use; `internal_config` at the URLs the
/// server uses to reach the provider over the private network. Both share the
/// client id and scopes.
#[derive(Clone)]
pub struct PrivateProvider {
    pub id: String,
    pub config: Arc<dyn OAuth2ExchangeConfig>,
    pub internal_config: Arc<dyn OAuth2ExchangeConfig>,
}

impl PrivateProvider {
    pub fn new(
        config: Arc<dyn OAuth2ExchangeConfig>,
        internal_config: Arc<dyn OAuth2ExchangeConfig>,
    ) -> Self {
        Self {
            id: config.settings().id.clone(),
            config,
            internal_config,
        }
    }
}

/// The private provider plus the external providers, in configuration order.
#[derive(Clone)]
pub struct ProviderRegistry {
    private: PrivateProvider,
    providers: Vec<OAuth2Provider>,
}

impl ProviderRegistry {
    pub fn new(private: PrivateProvider, providers: Vec<OAuth2Provider>) -> Self {
        Self { private, providers }
    }

    pub fn private(&self) -> &PrivateProvider {
        &self.private
    }

    pub fn is_private(&self, provider_id: &str) -> bool {
        self.private.id == provider_id
    }

    pub fn providers(&self) -> &[OAuth2Provider] {
        &self.providers
    }

    pub fn find(&self, provider_id: &str) -> Option<&OAuth2Provider> {
        self.providers.iter().find(|p| p.id == provider_id)
    }

    /// Exchange configuration used by the redirect endpoint for `provider_id`.
    pub fn exchange_config(&self, provider_id: &str) -> Option<&Arc<dyn OAuth2ExchangeConfig>> {
        if self.is_private(provider_id) {
            Some(&self.private.internal_config)
        } else {
            self.find(provider_id).map(|p| &p.config)
        }
    }
}
