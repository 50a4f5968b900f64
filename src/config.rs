use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage;

pub const DEFAULT_DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

pub struct Config {
    pub dictionary_api_url: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    /// Absent means the assistant runs on offline replies only
    pub gemini_api_key: Option<String>,
    pub data_dir: PathBuf,
    pub export_dir: Option<PathBuf>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let http_timeout_seconds = non_empty("HTTP_TIMEOUT_SECONDS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(30); // 30 seconds default

        Config {
            dictionary_api_url: non_empty("DICTIONARY_API_URL")
                .unwrap_or_else(|| DEFAULT_DICTIONARY_API_URL.to_string()),
            gemini_api_url: non_empty("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_model: non_empty("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_key: non_empty("GEMINI_API_KEY").map(|key| key.trim().to_string()),
            data_dir: non_empty("VERBOX_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(storage::default_data_dir),
            export_dir: non_empty("VERBOX_EXPORT_DIR").map(PathBuf::from),
            http_timeout: Duration::from_secs(http_timeout_seconds),
        }
    }
}
