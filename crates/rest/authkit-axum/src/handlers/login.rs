use crate::error::ApiError;
use crate::form::FormFields;
use crate::state::AppState;
use crate::validation::{ValidationError, is_email, validate_login, validate_password};
use authkit_core::StoreError;
use authkit_oauth2::authorization_url;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, info};

const MAX_SCOPE_LENGTH: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Login,
    Signup,
}

#[derive(Debug)]
struct Credentials<'a> {
    action: Action,
    login: &'a str,
    password: &'a str,
}

fn credentials(form: &FormFields) -> Result<Credentials<'_>, ValidationError> {
    let action = match form.get("action") {
        "login" => Action::Login,
        "signup" => Action::Signup,
        "" => return Err(ValidationError::new("action", "action-required")),
        _ => return Err(ValidationError::new("action", "action-format")),
    };
    let login = form.get("login");
    validate_login(login)?;
    let password = form.get("password");
    validate_password(password)?;
    Ok(Credentials {
        action,
        login,
        password,
    })
}

fn creation_failure(state: &AppState, err: StoreError) -> ApiError {
    if err.is_user_fault() {
        ApiError::unauthorized(state.errors.user_creation_error(&err)).with_internal(err)
    } else {
        ApiError::internal(err)
    }
}

/// Authenticates the user, or creates it on signup.
async fn sign_in(state: &AppState, credentials: &Credentials<'_>) -> Result<(), ApiError> {
    let Credentials {
        action,
        login,
        password,
    } = *credentials;

    match action {
        Action::Login => state
            .users
            .authenticate(login, password)
            .await
            .map_err(|e| state.store_failure(e)),
        Action::Signup => {
            // Email logins stay disabled until the address is confirmed.
            let created = if is_email(login) {
                state.users.create(login, password).await
            } else {
                state.users.create_enabled(login, password).await
            };
            created.map_err(|e| creation_failure(state, e))
        }
    }
}

/// Login from the application's own UI.
///
/// Replies `{"redirUrl"}`: the private provider's authorization URL carrying a
/// consent token for the application's client, so the browser completes the
/// code flow without a consent page.
pub async fn login(State(state): State<AppState>, form: FormFields) -> Result<Response, ApiError> {
    let credentials = credentials(&form).map_err(|e| state.invalid_parameter(e))?;
    sign_in(&state, &credentials).await?;

    let login = credentials.login;
    let email = (credentials.action == Action::Signup && is_email(login)).then_some(login);
    if credentials.action == Action::Signup {
        state
            .profiles
            .ensure_exists(login, email)
            .await
            .map_err(|e| creation_failure(&state, e))?;
    }

    let private = state.providers.private();
    let settings = private.config.settings();
    let consent = state
        .auth
        .generate_consent_token_for_client(login, &settings.scopes, &settings.client_id)
        .await
        .map_err(ApiError::internal)?;

    if let Some(email) = email {
        if let Err(e) = state
            .confirmer
            .request_email_confirmation(login, email, "")
            .await
        {
            debug!("Failed to request email confirmation for {}: {}", login, e);
        }
    }

    let token = state
        .settings
        .state
        .new_state_token_with_login(&private.id, login)
        .map_err(ApiError::internal)?;
    let redir_url = authorization_url(settings, &token, &[("consent", consent.as_str())])
        .map_err(ApiError::internal)?;

    info!("User {} logged in through {:?}", login, credentials.action);
    Ok(Json(json!({ "redirUrl": redir_url })).into_response())
}

/// Login from the trust authority's consent page. Replies `{"consent"}`, a
/// consent token bounded by the scopes of `challenge`.
pub async fn consent_login(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Response, ApiError> {
    let credentials = credentials(&form).map_err(|e| state.invalid_parameter(e))?;
    let challenge = form
        .required("challenge", "challenge-required")
        .map_err(|e| state.invalid_parameter(e))?;
    let scopes = form.all("scopes");
    if scopes.is_empty() {
        return Err(state.invalid_parameter(ValidationError::new("scopes", "scopes-required")));
    }
    if scopes
        .iter()
        .any(|s| s.is_empty() || s.chars().count() > MAX_SCOPE_LENGTH)
    {
        return Err(state.invalid_parameter(ValidationError::new("scopes", "scopes-format")));
    }

    sign_in(&state, &credentials).await?;

    let consent = state
        .auth
        .generate_consent_token(credentials.login, &scopes, challenge)
        .await
        .map_err(|e| {
            if e.is_rejection() {
                state.authentication_failed(e)
            } else {
                ApiError::internal(e)
            }
        })?;

    Ok(Json(json!({ "consent": consent })).into_response())
}
