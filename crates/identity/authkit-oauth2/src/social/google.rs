use super::{SocialProfileFetcher, get_json, login_from_email};
use crate::error::{OAuth2Error, OAuth2Result};
use crate::exchange::AuthorizedClient;
use async_trait::async_trait;
use authkit_core::{Profile, normalize_gender};
use serde::Deserialize;

const PEOPLE_API_URL: &str = "https://people.googleapis.com";
const PERSON_FIELDS: &str = "addresses,birthdays,emailAddresses,genders,names,phoneNumbers,photos";

#[derive(Debug, Deserialize)]
struct GoogleProfileResponse {
    #[serde(flatten)]
    profile: GoogleProfile,
    error: Option<GoogleError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoogleProfile {
    email_addresses: Vec<Entry>,
    names: Vec<Entry>,
    addresses: Vec<Entry>,
    photos: Vec<Entry>,
    birthdays: Vec<Entry>,
    genders: Vec<Entry>,
    phone_numbers: Vec<Entry>,
}

/// People API fields share a metadata block; only the value differs by name.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Entry {
    metadata: Metadata,
    value: String,
    display_name: String,
    formatted_value: String,
    url: String,
    text: String,
    canonical_form: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Metadata {
    primary: bool,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
}

/// Picks the entry flagged primary, falling back to the first one.
fn primary(entries: &[Entry]) -> Option<&Entry> {
    entries
        .iter()
        .find(|e| e.metadata.primary)
        .or_else(|| entries.first())
}

fn primary_value(entries: &[Entry], value: impl Fn(&Entry) -> &str) -> String {
    primary(entries).map(|e| value(e).to_string()).unwrap_or_default()
}

/// Google People API profile fetcher.
pub struct GoogleProfileFetcher {
    base_url: String,
}

impl Default for GoogleProfileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleProfileFetcher {
    pub fn new() -> Self {
        Self::with_base_url(PEOPLE_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SocialProfileFetcher for GoogleProfileFetcher {
    async fn fetch(&self, client: &AuthorizedClient) -> OAuth2Result<Profile> {
        let url = format!(
            "{}/v1/people/me?personFields={}",
            self.base_url, PERSON_FIELDS
        );
        let response: GoogleProfileResponse = get_json(client, &url).await?;
        if let Some(error) = response.error {
            return Err(OAuth2Error::ProfileRequestFailed(error.message));
        }

        let p = response.profile;
        let email = primary_value(&p.email_addresses, |e| e.value.as_str());
        let login = login_from_email(&email)?;
        let phones = p
            .phone_numbers
            .iter()
            .map(|e| {
                if e.canonical_form.is_empty() {
                    e.value.clone()
                } else {
                    e.canonical_form.clone()
                }
            })
            .filter(|phone| !phone.is_empty())
            .collect();

        Ok(Profile {
            login,
            email: Some(email),
            email_confirmed: false,
            formatted_name: primary_value(&p.names, |e| e.display_name.as_str()),
            location: primary_value(&p.addresses, |e| e.formatted_value.as_str()),
            picture: primary_value(&p.photos, |e| e.url.as_str()),
            birthday: primary_value(&p.birthdays, |e| e.text.as_str()),
            gender: normalize_gender(&primary_value(&p.genders, |e| e.value.as_str())),
            phones,
        })
    }
}
