use crate::handlers::{
    auth_code_urls, auth_providers, callback, change_password, confirm_email, consent_login, login,
    logout, restore_password,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// All authkit routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/callback", get(callback))
        .route("/confirm-email", get(confirm_email))
        .route("/api/auth-providers", get(auth_providers))
        .route("/api/auth-code-urls", get(auth_code_urls))
        .route("/api/login", post(consent_login))
        .route("/api/login-priv", post(login))
        .route("/api/restore-password", post(restore_password))
        .route("/api/change-password", post(change_password))
        .route("/api/logout", post(logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
