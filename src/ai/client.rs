use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================
// Error Types
// ============================================

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON from AI service: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    Service(reqwest::StatusCode),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl AssistantError {
    /// The service answered, but not usefully. Reported inside the
    /// transcript; everything else is treated as unexpected.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::Service(_) | Self::Malformed(_))
    }
}

pub type AssistantResult<T> = Result<T, AssistantError>;

/// Single-turn text generation
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    async fn generate(&self, prompt: &str) -> AssistantResult<String>;
}

// ============================================
// Gemini
// ============================================

pub const SYSTEM_FRAMING: &str = "You are a helpful vocabulary and language assistant. Help users with word meanings, usage, grammar, and language learning. Be concise but informative.";

/// Framing plus the user's raw text, as sent to the model
pub fn build_prompt(user_text: &str) -> String {
    format!("{SYSTEM_FRAMING} User question: {user_text}")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 300,
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
pub fn parse_generate_response(body: &str) -> AssistantResult<String> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;
    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| AssistantError::Malformed("no candidate text".to_string()))
}

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: String, model: String, api_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("falling back to default HTTP client: {err}");
                reqwest::Client::new()
            });
        Self::with_client(client, base_url, model, api_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        model: String,
        api_key: String,
    ) -> Self {
        Self {
            client,
            base_url,
            model,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn generate(&self, prompt: &str) -> AssistantResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig::default(),
        };

        tracing::debug!(model = %self.model, "generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(%status, "AI service error response: {body}");
            return Err(AssistantError::Service(status));
        }

        parse_generate_response(&body)
    }
}
