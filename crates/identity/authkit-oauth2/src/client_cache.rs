//! Per-provider HTTP clients.

use crate::config::ProviderSettings;
use crate::error::OAuth2Result;
use dashmap::DashMap;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Caches one reqwest client per provider id.
///
/// Clients are built with the provider's TLS settings on first use and reused for
/// every exchange, profile fetch and key fetch against that provider afterwards.
#[derive(Default)]
pub struct HttpClientCache {
    clients: DashMap<String, Client>,
}

impl HttpClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self, provider_id: &str, tls_skip_verify: bool) -> OAuth2Result<Client> {
        if let Some(client) = self.clients.get(provider_id) {
            return Ok(client.clone());
        }

        let client = build_client(tls_skip_verify)?;
        debug!(
            "Created HTTP client for provider {} (tls_skip_verify: {})",
            provider_id, tls_skip_verify
        );
        Ok(self
            .clients
            .entry(provider_id.to_string())
            .or_insert(client)
            .clone())
    }

    pub fn client_for(&self, settings: &ProviderSettings) -> OAuth2Result<Client> {
        self.client(&settings.id, settings.tls_skip_verify)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

pub(crate) fn build_client(tls_skip_verify: bool) -> OAuth2Result<Client> {
    Ok(Client::builder()
        .timeout(HTTP_TIMEOUT)
        .danger_accept_invalid_certs(tls_skip_verify)
        .build()?)
}
