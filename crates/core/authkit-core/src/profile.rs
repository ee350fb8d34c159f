//! User profiles (local copies of social profiles).

use crate::error::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// User profile. Social profiles are mapped onto this shape by the fetchers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed: bool,
    #[serde(default)]
    pub formatted_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub birthday: String,
    /// One of `male`, `female` or `-`.
    #[serde(default = "unknown_gender")]
    pub gender: String,
    #[serde(default)]
    pub phones: Vec<String>,
}

fn unknown_gender() -> String {
    "-".to_string()
}

impl Profile {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            gender: unknown_gender(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.formatted_name = name.into();
        self
    }
}

pub fn normalize_gender(gender: &str) -> String {
    if gender.eq_ignore_ascii_case("male") {
        "male".to_string()
    } else if gender.eq_ignore_ascii_case("female") {
        "female".to_string()
    } else {
        unknown_gender()
    }
}

/// Persists user profiles locally.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Creates an empty profile unless one exists already.
    async fn ensure_exists(&self, login: &str, email: Option<&str>) -> StoreResult<()>;

    async fn save(&self, profile: &Profile) -> StoreResult<()>;

    async fn set_email_confirmed(&self, login: &str, email: &str, confirmed: bool)
    -> StoreResult<()>;

    /// Returns the (confirmed or not) email and the display name.
    async fn email(&self, login: &str) -> StoreResult<(String, String)>;

    /// Returns the confirmed email and the display name, `UserNotFound` otherwise.
    async fn confirmed_email(&self, login: &str) -> StoreResult<(String, String)>;
}
