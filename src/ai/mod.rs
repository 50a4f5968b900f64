/// Vocabulary assistant
///
/// Answers free-form questions through a generative-language endpoint when a
/// credential is configured, and through deterministic templates otherwise.
///
/// # Architecture
///
/// - `client` - Gemini `generateContent` client and response parsing
/// - `conversation` - Transcript, request routing and waiting state
/// - `fallback` - Image-request deflection and offline keyword replies
///
/// # Usage
///
/// ```rust,no_run
/// use verbox::ai::Conversation;
///
/// # async fn example() {
/// let mut chat = Conversation::new(None);
/// chat.send_message("What does \"lucid\" mean?").await;
/// # }
/// ```
mod client;
mod conversation;
pub mod fallback;

pub use client::{
    AssistantError, AssistantResult, GeminiClient, GenerativeApi, SYSTEM_FRAMING, build_prompt,
    parse_generate_response,
};
pub use conversation::{
    CLEARED_GREETING, Conversation, GENERIC_ERROR, GREETING, PendingReply, QUICK_ACTIONS,
    QuickAction, SPEECH_RATE, reply_to,
};
