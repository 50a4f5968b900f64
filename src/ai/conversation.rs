use super::client::{AssistantError, AssistantResult, GenerativeApi, build_prompt};
use super::fallback;
use crate::capabilities::{CapabilityError, ClipboardWriter, SpeechSynthesizer};
use crate::types::{ChatMessage, Rating, Role};
use std::collections::HashMap;
use std::sync::Arc;

pub const GREETING: &str = "Hello! I'm your AI vocabulary assistant. I can help you with:\n\
• Word meanings and usage\n\
• Grammar questions\n\
• Vocabulary building\n\
• Creative descriptions and explanations\n\
• Language learning support\n\n\
Just ask me anything about words and language!";

pub const CLEARED_GREETING: &str = "Chat cleared! How can I help you with vocabulary today?";

/// Read-aloud speed for transcript messages
pub const SPEECH_RATE: f32 = 0.8;

pub const GENERIC_ERROR: &str = "Sorry, I encountered an error. Please try again.";

pub struct QuickAction {
    pub label: &'static str,
    pub prompt: &'static str,
}

/// Canned prompts offered while the transcript holds only the greeting
pub const QUICK_ACTIONS: [QuickAction; 4] = [
    QuickAction {
        label: "Random Word",
        prompt: "Give me a random interesting word with its meaning",
    },
    QuickAction {
        label: "Word Quiz",
        prompt: "Create a vocabulary quiz for me",
    },
    QuickAction {
        label: "Daily Tip",
        prompt: "Give me a daily language learning tip",
    },
    QuickAction {
        label: "Challenge",
        prompt: "Give me a challenging word puzzle",
    },
];

/// Produce the assistant's reply to `text`. Never fails: unexpected errors
/// become a generic apology.
pub async fn reply_to(api: Option<&dyn GenerativeApi>, text: &str) -> String {
    match route(api, text).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!("assistant request failed: {err}");
            GENERIC_ERROR.to_string()
        }
    }
}

async fn route(api: Option<&dyn GenerativeApi>, text: &str) -> AssistantResult<String> {
    if fallback::is_image_request(text) {
        tracing::info!("image request answered from template");
        return Ok(fallback::image_reply(text));
    }

    let Some(api) = api else {
        tracing::info!("no AI credential configured, using offline reply");
        return Ok(fallback::reply(text));
    };

    match api.generate(&build_prompt(text)).await {
        Ok(reply) => Ok(reply),
        Err(err) if err.is_service_failure() => {
            tracing::warn!("AI service failure: {err}");
            Ok(service_failure_message(&err))
        }
        Err(err) => Err(err),
    }
}

fn service_failure_message(err: &AssistantError) -> String {
    format!(
        "I encountered an issue with the AI service: {err}. Please try again in a moment, or use the Search tab to look the word up."
    )
}

/// A submitted message awaiting its reply. Tied to the transcript it was
/// submitted to, so a reply arriving after `clear_chat` is discarded.
#[derive(Debug)]
pub struct PendingReply {
    generation: u64,
    text: String,
}

impl PendingReply {
    pub fn text(&self) -> &str {
        &self.text
    }
}

pub struct Conversation {
    api: Option<Arc<dyn GenerativeApi>>,
    messages: Vec<ChatMessage>,
    ratings: HashMap<u64, Rating>,
    waiting: bool,
    generation: u64,
}

impl Conversation {
    pub fn new(api: Option<Arc<dyn GenerativeApi>>) -> Self {
        Self {
            api,
            messages: vec![ChatMessage::assistant(GREETING)],
            ratings: HashMap::new(),
            waiting: false,
            generation: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn has_credential(&self) -> bool {
        self.api.is_some()
    }

    /// Whether the quick actions should be offered
    pub fn is_fresh(&self) -> bool {
        self.messages.len() <= 1
    }

    /// Send `text` and wait for the reply. Returns `false` when nothing was
    /// sent (blank input or a reply already pending).
    pub async fn send_message(&mut self, text: &str) -> bool {
        let Some(pending) = self.submit(text) else {
            return false;
        };
        let api = self.api.clone();
        let reply = reply_to(api.as_deref(), pending.text()).await;
        self.receive(pending, reply);
        true
    }

    /// Append the user's message and enter the waiting state. Returns the
    /// pending request, or `None` if the message was not accepted.
    pub fn submit(&mut self, text: &str) -> Option<PendingReply> {
        if text.trim().is_empty() || self.waiting {
            return None;
        }
        self.messages.push(ChatMessage::user(text));
        self.waiting = true;
        Some(PendingReply {
            generation: self.generation,
            text: text.to_string(),
        })
    }

    /// Append the assistant's reply and return to idle. Returns `false` when
    /// the transcript was cleared since `pending` was submitted.
    pub fn receive(&mut self, pending: PendingReply, reply: String) -> bool {
        if pending.generation != self.generation {
            tracing::debug!("reply for a cleared transcript dropped");
            return false;
        }
        self.messages.push(ChatMessage::assistant(reply));
        self.waiting = false;
        true
    }

    /// Start over with a fresh greeting. Any reply still pending is orphaned
    /// and input is accepted again immediately.
    pub fn clear_chat(&mut self) {
        self.generation += 1;
        self.waiting = false;
        self.messages = vec![ChatMessage::assistant(CLEARED_GREETING)];
        self.ratings.clear();
    }

    /// Rate an assistant message. Returns `false` for unknown or user messages.
    pub fn rate(&mut self, id: u64, rating: Rating) -> bool {
        let is_assistant = self
            .messages
            .iter()
            .any(|msg| msg.id == id && msg.role == Role::Assistant);
        if is_assistant {
            self.ratings.insert(id, rating);
        }
        is_assistant
    }

    pub fn rating(&self, id: u64) -> Option<Rating> {
        self.ratings.get(&id).copied()
    }

    /// Copy a message's text. Returns `false` if no message has that id.
    pub fn copy_message(
        &self,
        id: u64,
        clipboard: &mut dyn ClipboardWriter,
    ) -> Result<bool, CapabilityError> {
        match self.messages.iter().find(|msg| msg.id == id) {
            Some(msg) => {
                clipboard.write_text(&msg.content)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Read a message aloud. Returns `false` if no message has that id.
    pub fn speak_message(&self, id: u64, speech: &dyn SpeechSynthesizer) -> bool {
        match self.messages.iter().find(|msg| msg.id == id) {
            Some(msg) => {
                speech.speak(&msg.content, SPEECH_RATE);
                true
            }
            None => false,
        }
    }
}
