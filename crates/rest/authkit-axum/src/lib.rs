//! HTTP surface of authkit.
//!
//! [`router`] mounts the login handlers on an axum [`Router`](axum::Router). The
//! handlers only depend on [`AppState`], whose collaborators are trait objects,
//! so hosts plug in their own stores and error payloads.

pub mod config;
mod error;
mod form;
mod handlers;
mod router;
mod state;
pub mod telemetry;
pub mod validation;

pub use error::{ApiError, DefaultErrorCustomizer, ErrorCustomizer};
pub use form::FormFields;
pub use router::router;
pub use state::{AppState, HandlerSettings};
