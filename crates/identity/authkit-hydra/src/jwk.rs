//! RSA JSON Web Keys as served by Hydra's key endpoints.

use crate::error::KeyFetchError;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

/// A JSON Web Key. Only the RSA members are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebKey {
    pub kty: String,
    #[serde(default)]
    pub kid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    pub n: String,
    pub e: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

/// Body of `GET /keys/{set}/{kid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySet {
    #[serde(default)]
    pub keys: Vec<WebKey>,
}

fn encode(n: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(n.to_bytes_be())
}

fn decode(name: &str, value: &str) -> Result<BigUint, KeyFetchError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| KeyFetchError::InvalidKey(format!("member {name}: {e}")))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str, KeyFetchError> {
    value
        .as_deref()
        .ok_or_else(|| KeyFetchError::InvalidKey(format!("missing private member {name}")))
}

impl WebKey {
    pub fn from_public_key(kid: impl Into<String>, key: &RsaPublicKey) -> Self {
        Self {
            kty: "RSA".to_string(),
            kid: kid.into(),
            alg: Some("RS256".to_string()),
            n: encode(key.n()),
            e: encode(key.e()),
            d: None,
            p: None,
            q: None,
        }
    }

    pub fn from_private_key(kid: impl Into<String>, key: &RsaPrivateKey) -> Self {
        let primes = key.primes();
        let mut jwk = Self::from_public_key(kid, &key.to_public_key());
        jwk.d = Some(encode(key.d()));
        jwk.p = primes.first().map(encode);
        jwk.q = primes.get(1).map(encode);
        jwk
    }

    fn ensure_rsa(&self) -> Result<(), KeyFetchError> {
        if self.kty != "RSA" {
            return Err(KeyFetchError::InvalidKey(format!(
                "unsupported key type {}",
                self.kty
            )));
        }
        Ok(())
    }

    /// Verification key from the public members.
    pub fn decoding_key(&self) -> Result<DecodingKey, KeyFetchError> {
        self.ensure_rsa()?;
        DecodingKey::from_rsa_components(&self.n, &self.e)
            .map_err(|e| KeyFetchError::InvalidKey(e.to_string()))
    }

    /// Signing key from the private members.
    pub fn encoding_key(&self) -> Result<EncodingKey, KeyFetchError> {
        self.ensure_rsa()?;
        let key = RsaPrivateKey::from_components(
            decode("n", &self.n)?,
            decode("e", &self.e)?,
            decode("d", required("d", &self.d)?)?,
            vec![
                decode("p", required("p", &self.p)?)?,
                decode("q", required("q", &self.q)?)?,
            ],
        )
        .map_err(|e| KeyFetchError::InvalidKey(e.to_string()))?;

        let der = key
            .to_pkcs1_der()
            .map_err(|e| KeyFetchError::InvalidKey(e.to_string()))?;
        Ok(EncodingKey::from_rsa_der(der.as_bytes()))
    }
}
