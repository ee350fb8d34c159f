//! Request handlers. Each one validates its input, calls collaborators in a fixed
//! order and maps their failures onto [`ApiError`]s.

mod callback;
mod confirm;
mod login;
mod logout;
mod password;
mod providers;

pub use callback::callback;
pub use confirm::confirm_email;
pub use login::{consent_login, login};
pub use logout::logout;
pub use password::{change_password, restore_password};
pub use providers::{auth_code_urls, auth_providers};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::ValidationError;
use authkit_apptoken::EmailToken;
use authkit_core::StoreError;
use thiserror::Error;

/// The password changed after the email token was issued.
#[derive(Debug, Error)]
#[error("token was issued for a previous password")]
struct StaleEmailToken;

impl AppState {
    fn invalid_parameter(&self, err: ValidationError) -> ApiError {
        ApiError::bad_request(self.errors.invalid_request_parameter_error(&err))
    }

    fn authentication_failed(
        &self,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> ApiError {
        ApiError::unauthorized(self.errors.user_authentication_error(&err)).with_internal(err)
    }

    /// User faults answer 401, anything else 500.
    fn store_failure(&self, err: StoreError) -> ApiError {
        if err.is_user_fault() {
            self.authentication_failed(err)
        } else {
            ApiError::internal(err)
        }
    }

    /// Parses an email token and checks that it was issued for the user's
    /// current password.
    async fn verify_email_token(&self, token: &str) -> Result<EmailToken, ApiError> {
        let token = self
            .settings
            .state
            .parse_email_token(token)
            .map_err(|e| self.authentication_failed(e))?;

        let user = self
            .users
            .user(&token.login)
            .await
            .map_err(|e| self.store_failure(e))?;
        if user.password_hash != token.password_hash {
            return Err(self.authentication_failed(StaleEmailToken));
        }
        Ok(token)
    }
}
