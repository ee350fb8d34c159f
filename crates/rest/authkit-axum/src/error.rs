//! HTTP error responses.

use crate::validation::ValidationError;
use authkit_core::{BoxError, StoreError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error};

/// Maps user-facing failures onto application specific response payloads.
///
/// Failures are grouped in three classes; the payload returned for each is sent
/// as the JSON body, so clients can render localized messages from error codes.
pub trait ErrorCustomizer: Send + Sync {
    /// Malformed or missing request parameters (400).
    fn invalid_request_parameter_error(&self, err: &ValidationError) -> Value;

    /// Signup failures (401).
    fn user_creation_error(&self, err: &StoreError) -> Value;

    /// Everything that means "you are not who you claim to be" (401).
    fn user_authentication_error(&self, err: &(dyn std::error::Error + 'static)) -> Value;
}

/// `{"code", "message"}` payloads.
#[derive(Debug, Clone, Default)]
pub struct DefaultErrorCustomizer;

fn coded(code: &str, err: &dyn std::error::Error) -> Value {
    json!({ "code": code, "message": err.to_string() })
}

impl ErrorCustomizer for DefaultErrorCustomizer {
    fn invalid_request_parameter_error(&self, err: &ValidationError) -> Value {
        coded("invalid_req_param", err)
    }

    fn user_creation_error(&self, err: &StoreError) -> Value {
        match err {
            StoreError::AccountDisabled => coded("account_disabled", err),
            StoreError::DuplicateUser => coded("duplicate_account", err),
            _ => coded("unknown_err", err),
        }
    }

    fn user_authentication_error(&self, err: &(dyn std::error::Error + 'static)) -> Value {
        coded("auth_err", err)
    }
}

/// Error response of a handler: status, public body and the private cause.
///
/// The cause is logged when the response is rendered and never sent to the client.
#[derive(Debug, Error)]
#[error("HTTP {status}: {body}")]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
    #[source]
    pub internal: Option<BoxError>,
}

impl ApiError {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            internal: None,
        }
    }

    pub fn with_internal(mut self, err: impl Into<BoxError>) -> Self {
        self.internal = Some(err.into());
        self
    }

    pub fn bad_request(body: Value) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    pub fn unauthorized(body: Value) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, body)
    }

    /// 500 with a generic body.
    pub fn internal(err: impl Into<BoxError>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Internal server error" }),
        )
        .with_internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = ?self.internal, "Request failed");
        } else {
            debug!(status = %self.status, error = ?self.internal, body = %self.body, "Request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}
