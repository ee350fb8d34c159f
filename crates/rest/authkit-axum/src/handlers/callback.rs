use crate::error::ApiError;
use crate::state::AppState;
use authkit_oauth2::{CallbackError, CallbackParams};
use axum::{
    extract::{Query, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;

/// OAuth2 redirect endpoint. On success the private access token is set as a
/// cookie and the browser is sent to `/`.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let outcome = state.callback.handle(&params).await.map_err(callback_failure)?;

    let cookie = Cookie::build((
        state.settings.auth_cookie_name.clone(),
        outcome.access_token,
    ))
    .secure(true);
    let jar = CookieJar::new().add(cookie);
    Ok((StatusCode::FOUND, jar, [(LOCATION, "/")]).into_response())
}

fn callback_failure(err: CallbackError) -> ApiError {
    match err {
        // The provider's own description is shown to the user.
        CallbackError::ProviderReported { .. } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": err.to_string() }),
        )
        .with_internal(err),
        err => ApiError::internal(err),
    }
}
