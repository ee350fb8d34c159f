//! Time-bounded cache of the consent keys.

use crate::error::KeyFetchError;
use crate::fetcher::KeyFetcher;
use crate::jwk::WebKey;
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const CONSENT_CHALLENGE_KEY_SET: &str = "hydra.consent.challenge";
pub const CONSENT_RESPONSE_KEY_SET: &str = "hydra.consent.response";
pub const DEFAULT_KEY_TTL: Duration = Duration::from_secs(10 * 60);

struct Entry<K> {
    key: K,
    fetched_at: Instant,
}

type Slot<K> = Mutex<Option<Entry<K>>>;

/// Holds the challenge verification key and the response signing key.
///
/// Each key lives in its own slot and is refetched lazily, under the slot's lock,
/// once it is older than the TTL. A failed refetch empties the slot, so the next
/// caller fetches again instead of reusing a stale key.
pub struct KeyCache {
    fetcher: Arc<dyn KeyFetcher>,
    ttl: Duration,
    challenge_key: Slot<DecodingKey>,
    response_key: Slot<EncodingKey>,
}

impl KeyCache {
    pub fn new(fetcher: Arc<dyn KeyFetcher>) -> Self {
        Self::with_ttl(fetcher, DEFAULT_KEY_TTL)
    }

    pub fn with_ttl(fetcher: Arc<dyn KeyFetcher>, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            challenge_key: Mutex::new(None),
            response_key: Mutex::new(None),
        }
    }

    pub async fn consent_challenge_public_key(&self) -> Result<DecodingKey, KeyFetchError> {
        self.get(
            &self.challenge_key,
            CONSENT_CHALLENGE_KEY_SET,
            "public",
            WebKey::decoding_key,
        )
        .await
    }

    pub async fn consent_response_private_key(&self) -> Result<EncodingKey, KeyFetchError> {
        self.get(
            &self.response_key,
            CONSENT_RESPONSE_KEY_SET,
            "private",
            WebKey::encoding_key,
        )
        .await
    }

    async fn get<K: Clone>(
        &self,
        slot: &Slot<K>,
        set: &str,
        kid: &str,
        convert: fn(&WebKey) -> Result<K, KeyFetchError>,
    ) -> Result<K, KeyFetchError> {
        let mut entry = slot.lock().await;
        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() <= self.ttl {
                return Ok(cached.key.clone());
            }
        }

        match self.fetcher.fetch(set, kid).await.and_then(|k| convert(&k)) {
            Ok(key) => {
                debug!("Refreshed key {}/{}", set, kid);
                *entry = Some(Entry {
                    key: key.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(key)
            }
            Err(e) => {
                warn!("Failed to refresh key {}/{}: {}", set, kid, e);
                *entry = None;
                Err(e)
            }
        }
    }
}
