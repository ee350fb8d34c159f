use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::ValidationError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmEmailQuery {
    #[serde(default)]
    token: String,
}

/// Target of the email confirmation link. Marks the address confirmed and
/// enables the account.
pub async fn confirm_email(
    State(state): State<AppState>,
    Query(query): Query<ConfirmEmailQuery>,
) -> Result<StatusCode, ApiError> {
    if query.token.is_empty() {
        return Err(state.invalid_parameter(ValidationError::new("token", "token-required")));
    }

    let token = state.verify_email_token(&query.token).await?;
    state
        .profiles
        .set_email_confirmed(&token.login, &token.email, true)
        .await
        .map_err(|e| state.store_failure(e))?;
    state
        .users
        .enable(&token.login)
        .await
        .map_err(|e| state.store_failure(e))?;

    info!("Email {} confirmed for {}", token.email, token.login);
    Ok(StatusCode::OK)
}
