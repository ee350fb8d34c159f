//! authkit demo server.
//!
//! Runs the login handlers against in-memory stores, with confirmation links
//! written to the log, and a Hydra instance as trust authority.

use anyhow::{Context, Result};
use authkit_apptoken::TokenSettings;
use authkit_axum::{
    AppState, DefaultErrorCustomizer, HandlerSettings, config::Config, router, telemetry,
};
use authkit_hydra::{
    ConsentIssuer, HydraAuthService, HydraKeyFetcher, HydraTokenIssuer, KeyCache, TokenRevoker,
};
use authkit_local::{InMemoryProfileStore, InMemoryUserStore, LinkConfirmer, LogMailer};
use authkit_oauth2::{
    CallbackOrchestrator, HttpClientCache, OAuth2Client, OAuth2ExchangeConfig, OAuth2Provider,
    PrivateProvider, ProviderRegistry, SocialProfileRegistry, UserProvisioner,
    social::{FacebookProfileFetcher, GoogleProfileFetcher},
};
use chrono::Duration;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use url::Url;

const HYDRA_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

fn social_profiles(config: &Config) -> SocialProfileRegistry {
    let mut registry = SocialProfileRegistry::new();
    for provider in &config.providers {
        registry = match provider.id.as_str() {
            "google" => registry.register("google", Arc::new(GoogleProfileFetcher::new())),
            "fb" | "facebook" => {
                registry.register(provider.id.clone(), Arc::new(FacebookProfileFetcher::new()))
            }
            other => {
                warn!("No social profile fetcher for provider {}, its logins will fail", other);
                registry
            }
        };
    }
    registry
}

fn build_state(config: &Config) -> Result<AppState> {
    let clients = HttpClientCache::new();
    let tokens = TokenSettings::new(
        config.state.token_issuer.clone(),
        config.state.sign_key.as_bytes().to_vec(),
        Duration::seconds(config.state.expiration_seconds),
    );

    let public_config: Arc<dyn OAuth2ExchangeConfig> = Arc::new(
        OAuth2Client::new(config.private_provider.public_settings(), &clients)
            .context("Invalid private provider configuration")?,
    );
    let internal_config: Arc<dyn OAuth2ExchangeConfig> = Arc::new(
        OAuth2Client::new(config.private_provider.internal_settings(), &clients)
            .context("Invalid private provider configuration")?,
    );
    let mut providers = Vec::with_capacity(config.providers.len());
    for settings in &config.providers {
        let client = OAuth2Client::new(settings.clone(), &clients)
            .with_context(|| format!("Invalid configuration of provider {}", settings.id))?;
        providers.push(OAuth2Provider::new(Arc::new(client)));
    }
    let registry = ProviderRegistry::new(
        PrivateProvider::new(public_config, internal_config.clone()),
        providers,
    );

    let users = Arc::new(InMemoryUserStore::new());
    let profiles = Arc::new(InMemoryProfileStore::new());
    let confirmer = Arc::new(LinkConfirmer::new(
        tokens.clone(),
        Duration::seconds(config.confirmation_link_lifespan_seconds),
        Url::parse(&config.external_base_url).context("Invalid external base URL")?,
        users.clone(),
        Arc::new(LogMailer),
    ));

    let hydra_http = reqwest::Client::builder()
        .timeout(HYDRA_TIMEOUT)
        .danger_accept_invalid_certs(config.hydra.tls_skip_verify)
        .build()
        .context("Failed to build Hydra HTTP client")?;
    let keys = Arc::new(KeyCache::new(Arc::new(HydraKeyFetcher::new(
        config.hydra.clone(),
        hydra_http.clone(),
    ))));
    let consent = Arc::new(ConsentIssuer::new(keys, config.hydra.challenge_lifespan()));
    let issuer = HydraTokenIssuer::new(consent.clone(), tokens.clone(), internal_config)
        .context("Failed to set up private token issuer")?;
    let auth = Arc::new(HydraAuthService::new(
        consent,
        issuer,
        TokenRevoker::new(config.hydra.clone(), hydra_http),
    ));

    let provisioner = Arc::new(UserProvisioner::new(
        users.clone(),
        profiles.clone(),
        confirmer.clone(),
        auth.clone(),
        config.private_provider.id.clone(),
    ));
    let callback = Arc::new(CallbackOrchestrator::new(
        tokens.clone(),
        registry.clone(),
        social_profiles(config),
        users.clone(),
        provisioner,
    ));

    Ok(AppState {
        settings: Arc::new(HandlerSettings {
            auth_cookie_name: config.auth_cookie_name.clone(),
            state: tokens,
            mod_time: config.mod_time,
        }),
        providers: registry,
        callback,
        auth,
        users,
        profiles,
        confirmer,
        errors: Arc::new(DefaultErrorCustomizer),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    telemetry::init(&config.logging, &config.log_filter())?;
    if config.uses_default_sign_key() {
        warn!("Using default state sign key - this is insecure for production!");
    }

    let state = build_state(&config)?;
    let app = router(state);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("authkit server listening on http://{}", addr);
    info!(
        "{} external provider(s), private provider {}",
        config.providers.len(),
        config.private_provider.id
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
