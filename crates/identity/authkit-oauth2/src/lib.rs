//! OAuth2 login plumbing for authkit.
//!
//! This crate exchanges authorization codes through an [`OAuth2ExchangeConfig`],
//! fetches social profiles, provisions internal users for external identities,
//! and drives the redirect endpoint through [`CallbackOrchestrator`].

mod callback;
mod client_cache;
mod config;
mod error;
mod exchange;
mod provider;
mod provisioner;
pub mod social;

#[cfg(test)]
mod testing;

pub use callback::{CallbackOrchestrator, CallbackOutcome, CallbackParams};
pub use client_cache::HttpClientCache;
pub use config::ProviderSettings;
pub use error::{CallbackError, OAuth2Error, OAuth2Result, ProvisioningError};
pub use exchange::{
    AuthorizedClient, OAuth2Client, OAuth2ExchangeConfig, TokenResponse, authorization_url,
};
pub use provider::{OAuth2Provider, PrivateProvider, ProviderRegistry};
pub use provisioner::UserProvisioner;
pub use social::{SocialProfileFetcher, SocialProfileRegistry};
