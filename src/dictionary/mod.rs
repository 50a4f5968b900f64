mod lookup;

pub use lookup::{LookupError, LookupFlow, LookupState, LookupTicket};

use crate::entry::WordEntry;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryApiError {
    #[error("Network error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Dictionary API returned {0}")]
    Status(reqwest::StatusCode),

    #[error("No entries for {0:?}")]
    Empty(String),

    #[error("Invalid dictionary URL: {0}")]
    InvalidUrl(String),
}

/// Source of dictionary entries
#[async_trait]
pub trait DictionaryApi: Send + Sync {
    /// All entries the upstream returns for `word`. An empty result is an error.
    async fn fetch(&self, word: &str) -> Result<Vec<WordEntry>, DictionaryApiError>;
}

/// Client for the free dictionary API (`GET {base}/en/{word}`)
#[derive(Clone)]
pub struct FreeDictionaryClient {
    client: reqwest::Client,
    base_url: String,
}

impl FreeDictionaryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("falling back to default HTTP client: {err}");
                reqwest::Client::new()
            });
        Self::with_client(client, base_url)
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn entry_url(&self, word: &str) -> Result<reqwest::Url, DictionaryApiError> {
        let mut url = reqwest::Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| DictionaryApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| DictionaryApiError::InvalidUrl(self.base_url.clone()))?
            .push("en")
            .push(word);
        Ok(url)
    }
}

#[async_trait]
impl DictionaryApi for FreeDictionaryClient {
    async fn fetch(&self, word: &str) -> Result<Vec<WordEntry>, DictionaryApiError> {
        let url = self.entry_url(word)?;
        tracing::debug!(%url, "dictionary request");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DictionaryApiError::Status(status));
        }

        let entries = response.json::<Vec<WordEntry>>().await?;
        if entries.is_empty() {
            return Err(DictionaryApiError::Empty(word.to_string()));
        }
        Ok(entries)
    }
}
