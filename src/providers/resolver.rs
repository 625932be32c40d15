//! Resolve the classifier API key from the remote credential store
//!
//! The key is fetched lazily on first need and cached only on success: a
//! failed fetch leaves the resolver keyless and the next classification
//! attempt re-fetches on demand. Recognition is never blocked by a missing
//! key.

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Max response-body bytes attached to a fetch error
const ERROR_BODY_LIMIT: usize = 200;

/// One record from the credential store; the key field is named `apikey`
#[derive(Debug, Deserialize)]
struct KeyRecord {
    #[serde(default)]
    apikey: String,
}

/// The store answers with either a list of records or a single record
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyResponse {
    Many(Vec<KeyRecord>),
    One(KeyRecord),
}

impl KeyResponse {
    /// The `apikey` field of the first record, trimmed
    fn first_key(self) -> Option<String> {
        let record = match self {
            Self::Many(records) => records.into_iter().next()?,
            Self::One(record) => record,
        };
        let key = record.apikey.trim().to_string();
        (!key.is_empty()).then_some(key)
    }
}

/// Lazily fetches and caches the classifier API key
pub struct KeyResolver {
    client: reqwest::Client,
    url: String,
    cached: RwLock<Option<String>>,
}

impl KeyResolver {
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            cached: RwLock::new(None),
        }
    }

    /// Return the cached key, fetching from the store if none is held
    ///
    /// # Errors
    ///
    /// Returns [`Error::Credential`] if the store is unreachable, answers
    /// with a non-2xx status, or the first record lacks a usable `apikey`
    /// field. Nothing is cached on failure.
    pub async fn resolve(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(key) = cached.as_ref() {
                return Ok(key.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have fetched while we waited for the write lock
        if let Some(key) = cached.as_ref() {
            return Ok(key.clone());
        }

        let key = self.fetch().await?;
        *cached = Some(key.clone());
        tracing::info!("API key loaded from credential store (first record)");
        Ok(key)
    }

    /// Fetch the key from the store endpoint
    async fn fetch(&self) -> Result<String> {
        tracing::debug!(url = %self.url, "fetching classifier API key");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Credential(format!("key store request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = truncate(&body, ERROR_BODY_LIMIT);
            return Err(Error::Credential(format!("key store HTTP {status}: {body}")));
        }

        let parsed: KeyResponse = response
            .json()
            .await
            .map_err(|e| Error::Credential(format!("invalid key store response: {e}")))?;

        parsed.first_key().ok_or_else(|| {
            Error::Credential("first record has no 'apikey' field".to_string())
        })
    }
}

/// Truncate on a char boundary
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
