//! Store error kinds.

use thiserror::Error;

/// Boxed error used at trait seams where the implementation is supplied by the host.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by user and profile stores.
///
/// Login logic branches on the kind (not found is expected for first-time external
/// users, duplicate user is reported to the client on signup), so stores must map
/// their backend failures onto these variants.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate user")]
    DuplicateUser,

    #[error("user not found")]
    UserNotFound,

    #[error("account disabled")]
    AccountDisabled,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("request confirmation failed: {0}")]
    RequestConfirmation(#[source] BoxError),

    #[error("store backend error: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        StoreError::Backend(err.into())
    }

    pub fn is_duplicate_user(&self) -> bool {
        matches!(self, StoreError::DuplicateUser)
    }

    pub fn is_user_not_found(&self) -> bool {
        matches!(self, StoreError::UserNotFound)
    }

    pub fn is_account_disabled(&self) -> bool {
        matches!(self, StoreError::AccountDisabled)
    }

    /// True for failures caused by the caller's input rather than by the backend.
    pub fn is_user_fault(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateUser
                | StoreError::UserNotFound
                | StoreError::AccountDisabled
                | StoreError::InvalidCredentials
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
