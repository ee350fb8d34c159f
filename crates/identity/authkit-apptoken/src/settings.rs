use crate::email::{EmailToken, new_email_token_with_login, parse_email_token};
use crate::error::TokenResult;
use crate::state::{StateToken, new_state_token_with_login, parse_state_token};
use chrono::Duration;

/// Issuer, signing key and lifetime shared by every token an application mints.
#[derive(Clone)]
pub struct TokenSettings {
    pub issuer: String,
    pub sign_key: Vec<u8>,
    pub expiration: Duration,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("issuer", &self.issuer)
            .field("sign_key", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl TokenSettings {
    pub fn new(issuer: impl Into<String>, sign_key: impl Into<Vec<u8>>, expiration: Duration) -> Self {
        Self {
            issuer: issuer.into(),
            sign_key: sign_key.into(),
            expiration,
        }
    }

    pub fn new_state_token(&self, provider_id: &str) -> TokenResult<String> {
        self.new_state_token_with_login(provider_id, "")
    }

    pub fn new_state_token_with_login(&self, provider_id: &str, login: &str) -> TokenResult<String> {
        new_state_token_with_login(&self.issuer, provider_id, login, self.expiration, &self.sign_key)
    }

    pub fn parse_state_token(&self, token: &str) -> TokenResult<StateToken> {
        parse_state_token(&self.issuer, token, &self.sign_key)
    }

    /// Email tokens get their own lifetime, confirmation links usually outlive a login round-trip.
    pub fn new_email_token(
        &self,
        login: &str,
        email: &str,
        password_hash: &str,
        expiration: Duration,
    ) -> TokenResult<String> {
        new_email_token_with_login(&self.issuer, login, email, password_hash, expiration, &self.sign_key)
    }

    pub fn parse_email_token(&self, token: &str) -> TokenResult<EmailToken> {
        parse_email_token(&self.issuer, token, &self.sign_key)
    }
}
