use super::{SocialProfileFetcher, get_json, login_from_email};
use crate::error::{OAuth2Error, OAuth2Result};
use crate::exchange::AuthorizedClient;
use async_trait::async_trait;
use authkit_core::{Profile, normalize_gender};
use serde::Deserialize;

const GRAPH_API_URL: &str = "https://graph.facebook.com";
const PROFILE_FIELDS: &str = "id,email,name,picture,birthday,gender,location";

#[derive(Debug, Deserialize)]
struct FacebookProfileResponse {
    #[serde(flatten)]
    profile: FacebookProfile,
    error: Option<FacebookError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FacebookProfile {
    email: String,
    name: String,
    picture: FacebookPicture,
    birthday: String,
    gender: String,
    location: FacebookLocation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FacebookPictureData {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FacebookLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FacebookError {
    #[serde(default)]
    message: String,
}

/// Facebook Graph API profile fetcher.
pub struct FacebookProfileFetcher {
    base_url: String,
}

impl Default for FacebookProfileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FacebookProfileFetcher {
    pub fn new() -> Self {
        Self::with_base_url(GRAPH_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SocialProfileFetcher for FacebookProfileFetcher {
    async fn fetch(&self, client: &AuthorizedClient) -> OAuth2Result<Profile> {
        let url = format!("{}/me?fields={}", self.base_url, PROFILE_FIELDS);
        let response: FacebookProfileResponse = get_json(client, &url).await?;
        if let Some(error) = response.error {
            return Err(OAuth2Error::ProfileRequestFailed(error.message));
        }

        let p = response.profile;
        let login = login_from_email(&p.email)?;
        Ok(Profile {
            login,
            email: Some(p.email),
            email_confirmed: false,
            formatted_name: p.name,
            location: p.location.name,
            picture: p.picture.data.url,
            birthday: p.birthday,
            gender: normalize_gender(&p.gender),
            phones: Vec::new(),
        })
    }
}
