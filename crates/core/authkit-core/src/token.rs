//! OAuth2 token value type.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are treated as expired this many seconds before their actual expiry,
/// so that a token handed to a client does not expire in flight.
pub const EXPIRY_DELTA_SECONDS: i64 = 10;

/// OAuth2 token as returned by a code exchange and stored per user and provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry; `None` means the token does not expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuth2Token {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            refresh_token: None,
            expiry: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets the expiry relative to now, the way token endpoints report `expires_in`.
    /// Returns `None` when `now + seconds` is out of range.
    pub fn try_expires_in(self, seconds: i64) -> Option<Self> {
        let expiry = Duration::try_seconds(seconds)
            .and_then(|d| Utc::now().checked_add_signed(d))?;
        Some(self.with_expiry(expiry))
    }

    /// Like [`OAuth2Token::try_expires_in`], saturating at the representable range.
    pub fn expires_in(self, seconds: i64) -> Self {
        let bound = if seconds < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        };
        let expiry = Duration::try_seconds(seconds)
            .and_then(|d| Utc::now().checked_add_signed(d))
            .unwrap_or(bound);
        self.with_expiry(expiry)
    }

    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => expiry
                .checked_sub_signed(Duration::seconds(EXPIRY_DELTA_SECONDS))
                .is_none_or(|deadline| deadline < Utc::now()),
            None => false,
        }
    }

    /// A token is valid when it carries an access token and has not expired.
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }
}
