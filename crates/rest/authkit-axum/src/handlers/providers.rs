use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{
        HeaderMap, StatusCode,
        header::{EXPIRES, IF_MODIFIED_SINCE, LAST_MODIFIED},
    },
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ProviderInfo<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "iconUrl")]
    icon_url: &'a str,
}

#[derive(Debug, Serialize)]
struct ProvidersReply<'a> {
    providers: Vec<ProviderInfo<'a>>,
}

#[derive(Debug, Serialize)]
struct AuthCodeUrl {
    id: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct AuthCodeUrlsReply {
    urls: Vec<AuthCodeUrl>,
}

fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn not_modified_since(headers: &HeaderMap, mod_time: DateTime<Utc>) -> bool {
    headers
        .get(IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .is_some_and(|since| since.with_timezone(&Utc) >= mod_time)
}

/// Configured external providers for the login page. Cacheable: carries
/// `Last-Modified` and honours `If-Modified-Since`.
pub async fn auth_providers(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mod_time = state.settings.mod_time.trunc_subsecs(0);
    let validators = [
        (LAST_MODIFIED, http_date(mod_time)),
        (EXPIRES, http_date(Utc::now())),
    ];

    if not_modified_since(&headers, mod_time) {
        return (StatusCode::NOT_MODIFIED, validators).into_response();
    }

    let reply = ProvidersReply {
        providers: state
            .providers
            .providers()
            .iter()
            .map(|p| ProviderInfo {
                id: &p.id,
                name: &p.name,
                icon_url: &p.icon_url,
            })
            .collect(),
    };
    (validators, Json(reply)).into_response()
}

/// Authorization URLs of every external provider, each with a fresh state token.
/// Not cacheable.
pub async fn auth_code_urls(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut urls = Vec::with_capacity(state.providers.providers().len());
    for provider in state.providers.providers() {
        let token = state
            .settings
            .state
            .new_state_token(&provider.id)
            .map_err(ApiError::internal)?;
        let url = provider
            .config
            .auth_code_url(&token)
            .map_err(ApiError::internal)?;
        urls.push(AuthCodeUrl {
            id: provider.id.clone(),
            url,
        });
    }
    Ok(Json(AuthCodeUrlsReply { urls }).into_response())
}
