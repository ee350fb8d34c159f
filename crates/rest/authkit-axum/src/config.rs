//! Configuration of the authkit server.
//!
//! Sources, later ones winning:
//! - defaults
//! - a TOML file (`authkit.toml`, or the path in `AUTHKIT_CONFIG_FILE`)
//! - environment variables with the `AUTHKIT` prefix and `__` between nested
//!   keys, e.g. `AUTHKIT__SERVER__PORT`

use anyhow::{Context, Result};
use authkit_hydra::HydraSettings;
use authkit_oauth2::ProviderSettings;
use chrono::{DateTime, Utc};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::IpAddr;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,

    /// Public base URL of the application, used in confirmation links.
    #[serde(default = "default_external_base_url")]
    pub external_base_url: String,

    /// Cookie that receives the private access token after a callback.
    #[serde(default = "default_auth_cookie_name")]
    pub auth_cookie_name: String,

    /// State and email token settings.
    pub state: StateConfig,

    /// Lifetime of confirmation links in seconds (default: 86400).
    #[serde(default = "default_confirmation_link_lifespan")]
    pub confirmation_link_lifespan_seconds: i64,

    pub private_provider: PrivateProviderConfig,

    /// External OAuth2 providers, in display order.
    pub providers: Vec<ProviderSettings>,

    #[serde(default = "default_hydra")]
    pub hydra: HydraSettings,

    pub logging: LoggingConfig,

    /// When this configuration was loaded.
    #[serde(skip, default = "Utc::now")]
    pub mod_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    #[serde(default = "default_token_issuer")]
    pub token_issuer: String,

    #[serde(default = "default_sign_key")]
    pub sign_key: String,

    /// Lifetime of state tokens in seconds (default: 600)
    #[serde(default = "default_state_expiration")]
    pub expiration_seconds: i64,
}

/// The application's own OAuth2 provider.
///
/// Browsers use `auth_url` and `token_url`; the server reaches the provider
/// through `internal_auth_url` and `internal_token_url` when they are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateProviderConfig {
    #[serde(default = "default_private_provider_id")]
    pub id: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub internal_auth_url: Option<String>,
    pub internal_token_url: Option<String>,
    pub redirect_url: String,
    pub scopes: Vec<String>,
    pub tls_skip_verify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default = "default_true")]
    pub target: bool,

    #[serde(default)]
    pub line_numbers: bool,
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_external_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_auth_cookie_name() -> String {
    "X-App-Auth".to_string()
}

fn default_token_issuer() -> String {
    "authkit".to_string()
}

/// Ten years; token expiries are computed from now and must stay representable.
const MAX_LIFESPAN_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

const DEFAULT_SIGN_KEY: &str = "dev-sign-key-change-in-production";

fn default_sign_key() -> String {
    DEFAULT_SIGN_KEY.to_string()
}

fn default_state_expiration() -> i64 {
    600
}

fn default_confirmation_link_lifespan() -> i64 {
    86400
}

fn default_private_provider_id() -> String {
    "authkit".to_string()
}

fn default_hydra() -> HydraSettings {
    HydraSettings::new("http://localhost:4444", "authkit", "")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            external_base_url: default_external_base_url(),
            auth_cookie_name: default_auth_cookie_name(),
            state: StateConfig::default(),
            confirmation_link_lifespan_seconds: default_confirmation_link_lifespan(),
            private_provider: PrivateProviderConfig::default(),
            providers: Vec::new(),
            hydra: default_hydra(),
            logging: LoggingConfig::default(),
            mod_time: Utc::now(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            token_issuer: default_token_issuer(),
            sign_key: default_sign_key(),
            expiration_seconds: default_state_expiration(),
        }
    }
}

impl Default for PrivateProviderConfig {
    fn default() -> Self {
        Self {
            id: default_private_provider_id(),
            client_id: String::new(),
            client_secret: String::new(),
            auth_url: String::new(),
            token_url: String::new(),
            internal_auth_url: None,
            internal_token_url: None,
            redirect_url: String::new(),
            scopes: Vec::new(),
            tls_skip_verify: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: true,
            line_numbers: false,
        }
    }
}

impl PrivateProviderConfig {
    fn settings(&self, auth_url: &str, token_url: &str) -> ProviderSettings {
        ProviderSettings::new(&self.id, &self.client_id, auth_url, token_url)
            .with_client_secret(&self.client_secret)
            .with_redirect_url(&self.redirect_url)
            .with_scopes(self.scopes.iter().cloned())
            .with_tls_skip_verify(self.tls_skip_verify)
    }

    /// Settings with the URLs browsers use.
    pub fn public_settings(&self) -> ProviderSettings {
        self.settings(&self.auth_url, &self.token_url)
    }

    /// Settings with the URLs the server uses.
    pub fn internal_settings(&self) -> ProviderSettings {
        self.settings(
            self.internal_auth_url.as_deref().unwrap_or(&self.auth_url),
            self.internal_token_url.as_deref().unwrap_or(&self.token_url),
        )
    }
}

impl Config {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_path =
            std::env::var("AUTHKIT_CONFIG_FILE").unwrap_or_else(|_| "authkit.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            info!("Loading configuration from {}", config_path);
            builder = builder.add_source(File::with_name(&config_path));
        } else {
            debug!("No config file found at {}, using defaults", config_path);
        }

        builder = builder.add_source(
            Environment::with_prefix("AUTHKIT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut settings: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        settings.mod_time = Utc::now();

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.state.sign_key.is_empty() {
            anyhow::bail!("State sign key cannot be empty");
        }
        for (name, seconds) in [
            ("State token expiration", self.state.expiration_seconds),
            ("Confirmation link lifespan", self.confirmation_link_lifespan_seconds),
            ("Consent challenge lifespan", self.hydra.challenge_lifespan_seconds),
        ] {
            if !(1..=MAX_LIFESPAN_SECONDS).contains(&seconds) {
                anyhow::bail!("{name} must be between 1 and {MAX_LIFESPAN_SECONDS} seconds");
            }
        }

        url::Url::parse(&self.external_base_url)
            .with_context(|| format!("Invalid external base URL '{}'", self.external_base_url))?;

        if self.private_provider.id.is_empty() {
            anyhow::bail!("Private provider id cannot be empty");
        }
        if self.private_provider.client_id.is_empty() {
            anyhow::bail!("Private provider client id cannot be empty");
        }

        let mut ids = HashSet::new();
        for provider in &self.providers {
            if provider.id.is_empty() {
                anyhow::bail!("Provider id cannot be empty");
            }
            if provider.id == self.private_provider.id {
                anyhow::bail!(
                    "Provider id '{}' is reserved for the private provider",
                    provider.id
                );
            }
            if !ids.insert(provider.id.as_str()) {
                anyhow::bail!("Duplicate provider id '{}'", provider.id);
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !self.is_filter_directive() && !valid_levels.contains(&level_lower.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let valid_formats = ["pretty", "json", "compact"];
        let format_lower = self.logging.format.to_lowercase();
        if !valid_formats.contains(&format_lower.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        Ok(())
    }

    /// True when no sign key was configured; insecure outside development.
    pub fn uses_default_sign_key(&self) -> bool {
        self.state.sign_key == DEFAULT_SIGN_KEY
    }

    fn is_filter_directive(&self) -> bool {
        self.logging.level.contains('=') || self.logging.level.contains(',')
    }

    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from((self.server.host, self.server.port))
    }

    /// Get the log filter string for tracing
    pub fn log_filter(&self) -> String {
        if self.is_filter_directive() {
            self.logging.level.clone()
        } else {
            format!("{},tower_http={}", self.logging.level, self.logging.level)
        }
    }
}
