//! Hydra trust authority integration.
//!
//! - [`KeyCache`] keeps the consent challenge verification key and the consent
//!   response signing key, refetching each through a [`KeyFetcher`] after a TTL.
//! - [`ConsentIssuer`] verifies consent challenges and signs consent tokens.
//! - [`HydraTokenIssuer`] mints private provider tokens for authenticated users.
//! - [`HydraAuthService`] bundles these behind [`AuthService`] for the handlers.

mod cache;
mod config;
mod consent;
mod error;
mod fetcher;
mod issuer;
mod jwk;
mod service;

pub use cache::{CONSENT_CHALLENGE_KEY_SET, CONSENT_RESPONSE_KEY_SET, DEFAULT_KEY_TTL, KeyCache};
pub use config::HydraSettings;
pub use consent::{ConsentClaims, ConsentIssuer};
pub use error::{ConsentError, IssueError, KeyFetchError};
pub use fetcher::{HydraKeyFetcher, KeyFetcher};
pub use issuer::{HydraTokenIssuer, TokenRevoker};
pub use jwk::{KeySet, WebKey};
pub use service::{AuthService, HydraAuthService};
