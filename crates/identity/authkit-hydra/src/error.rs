use authkit_apptoken::InvalidToken;
use authkit_oauth2::OAuth2Error;
use thiserror::Error;

/// The trust authority's keys could not be retrieved or decoded.
#[derive(Debug, Error)]
pub enum KeyFetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to obtain client credentials token: {0}")]
    Credentials(String),

    #[error("failed to retrieve key {set}/{kid}, status: {status}")]
    UnexpectedStatus {
        set: String,
        kid: String,
        status: reqwest::StatusCode,
    },

    #[error("no keys returned for {set}/{kid}")]
    EmptyKeySet { set: String, kid: String },

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("invalid consent challenge: {0}")]
    InvalidChallenge(#[source] InvalidToken),

    #[error("disallowed to enlarge set of scopes: {scope}")]
    ScopeEscalation { scope: String },

    #[error(transparent)]
    KeyFetch(#[from] KeyFetchError),

    #[error("failed to sign consent token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("consent expiry out of range")]
    ExpiryOutOfRange,
}

impl ConsentError {
    /// True when the request itself was at fault (bad challenge or widened scopes).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ConsentError::InvalidChallenge(_) | ConsentError::ScopeEscalation { .. }
        )
    }
}

/// Minting or revoking a private provider token failed.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Consent(#[from] ConsentError),

    #[error("failed to create state token: {0}")]
    State(#[from] InvalidToken),

    #[error(transparent)]
    OAuth2(#[from] OAuth2Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("no authorization code in redirect")]
    MissingCode,

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
}
