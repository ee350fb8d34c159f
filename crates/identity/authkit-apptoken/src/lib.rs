//! State and email tokens.
//!
//! Both token kinds are compact JWTs signed with HMAC-SHA256 over a shared secret.
//! A state token carries the provider id (and optionally the login) through an
//! OAuth2 redirect round-trip. An email token carries the login and the password
//! hash at issue time inside confirmation and password-reset links.

mod claims;
mod email;
mod error;
mod settings;
mod state;

pub use email::{EmailToken, new_email_token, new_email_token_with_login, parse_email_token};
pub use error::{InvalidToken, TokenFault, TokenResult};
pub use settings::TokenSettings;
pub use state::{StateToken, new_state_token, new_state_token_with_login, parse_state_token};
