use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::ValidationError;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::info;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Revokes the private access token in the `Authorization` header, first at the
/// trust authority and then in the user store.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let token = bearer_token(&headers).ok_or_else(|| {
        state.invalid_parameter(ValidationError::new("authorization", "bearer-required"))
    })?;

    state
        .auth
        .revoke_access_token(token)
        .await
        .map_err(ApiError::internal)?;
    state
        .users
        .revoke_access_token(&state.providers.private().id, token)
        .await
        .map_err(ApiError::internal)?;

    info!("Access token revoked");
    Ok(Json(json!({})).into_response())
}
