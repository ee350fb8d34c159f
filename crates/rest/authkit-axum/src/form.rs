//! Form bodies, urlencoded or multipart.

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::ValidationError;
use axum::{
    body::Bytes,
    extract::{FromRef, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use tracing::debug;

/// Name/value pairs of a submitted form, in submission order.
///
/// Repeated fields (such as `scopes`) are kept; [`FormFields::all`] returns every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self(fields)
    }

    /// First value of `name`, or `""`.
    pub fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    }

    pub fn all(&self, name: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// First value of `name`; `{field}-required` when missing or empty.
    pub fn required(&self, name: &'static str, rule: &'static str) -> Result<&str, ValidationError> {
        match self.get(name) {
            "" => Err(ValidationError::new(name, rule)),
            value => Ok(value),
        }
    }
}

impl<S> FromRequest<S> for FormFields
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let reject = |reason: String| {
            debug!("Unreadable form: {}", reason);
            ApiError::bad_request(
                app.errors
                    .invalid_request_parameter_error(&ValidationError::new("body", "form-format")),
            )
        };

        let multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| reject(e.body_text()))?;
            let mut fields = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| reject(e.body_text()))?
            {
                let name = field.name().unwrap_or_default().to_string();
                let value = field.text().await.map_err(|e| reject(e.body_text()))?;
                fields.push((name, value));
            }
            Ok(Self(fields))
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| reject(e.body_text()))?;
            Ok(Self(
                url::form_urlencoded::parse(&body).into_owned().collect(),
            ))
        }
    }
}
