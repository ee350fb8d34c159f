//! Core types and collaborator traits shared by the authkit crates.
//!
//! The login flow itself lives in `authkit-oauth2` and `authkit-hydra`; this crate
//! only describes what those crates need from the host application: a user store,
//! a profile store, a way to send confirmations and a way to mint tokens of the
//! application's own OAuth2 provider.

mod error;
mod profile;
mod token;
mod user;

pub use error::{BoxError, StoreError, StoreResult};
pub use profile::{Profile, ProfileStore, normalize_gender};
pub use token::{EXPIRY_DELTA_SECONDS, OAuth2Token};
pub use user::{Confirmer, PrivateTokenIssuer, User, UserStore};
