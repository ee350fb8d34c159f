//! OAuth2, provisioning and callback error types.

use authkit_apptoken::InvalidToken;
use authkit_core::{BoxError, StoreError};
use thiserror::Error;

pub type OAuth2Result<T> = Result<T, OAuth2Error>;

/// Failures talking to an OAuth2 provider.
#[derive(Debug, Error)]
pub enum OAuth2Error {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Social profile request failed: {0}")]
    ProfileRequestFailed(String),

    #[error("Invalid social profile response: {0}")]
    InvalidProfileResponse(String),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

/// Failures while reconciling an external identity with the internal user store.
///
/// Each variant names the write or read that failed; earlier writes are not rolled back.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("failed to look up user {login}: {source}")]
    LookupUser {
        login: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to create user {login}: {source}")]
    CreateUser {
        login: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to save profile of {login}: {source}")]
    SaveProfile {
        login: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to store {provider_id} token of {login}: {source}")]
    StoreToken {
        login: String,
        provider_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to load {provider_id} token of {login}: {source}")]
    LoadToken {
        login: String,
        provider_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to mint private token for {login}: {source}")]
    Mint {
        login: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to generate password: {0}")]
    RandomPassword(#[source] rand::Error),
}

/// Failures of the OAuth2 redirect endpoint.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("OAuth2 flow failed, error: {error}, description: {description}")]
    ProviderReported { error: String, description: String },

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid state: {0}")]
    InvalidState(#[from] InvalidToken),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("code exchange with {provider_id} failed: {source}")]
    Exchange {
        provider_id: String,
        #[source]
        source: OAuth2Error,
    },

    #[error("failed to fetch social profile from {provider_id}: {source}")]
    SocialProfile {
        provider_id: String,
        #[source]
        source: OAuth2Error,
    },

    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    #[error("failed to store token for {login}: {source}")]
    Store {
        login: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),
}
