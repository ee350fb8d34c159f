use crate::error::ApiError;
use crate::form::FormFields;
use crate::state::AppState;
use crate::validation::{validate_login, validate_password};
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::info;

/// "Forgot password": mails a password change link to the user's confirmed address.
pub async fn restore_password(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Response, ApiError> {
    let login = form.get("login");
    validate_login(login).map_err(|e| state.invalid_parameter(e))?;

    let user = state
        .users
        .user(login)
        .await
        .map_err(|e| state.store_failure(e))?;
    let (email, name) = state
        .profiles
        .confirmed_email(login)
        .await
        .map_err(|e| state.store_failure(e))?;

    state
        .confirmer
        .request_password_change_confirmation(login, &email, &name, &user.password_hash)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(json!({})).into_response())
}

/// Sets a new password for the user named by a password change link.
pub async fn change_password(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Response, ApiError> {
    let password = form.get("password1");
    validate_password(password).map_err(|e| state.invalid_parameter(e))?;
    let token = form
        .required("token", "token-required")
        .map_err(|e| state.invalid_parameter(e))?;

    let token = state.verify_email_token(token).await?;
    state
        .users
        .update_password(&token.login, password)
        .await
        .map_err(|e| state.store_failure(e))?;

    info!("Password changed for {}", token.login);
    Ok(Json(json!({})).into_response())
}
