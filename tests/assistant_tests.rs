//! Integration tests for the vocabulary assistant
//!
//! A scripted generative endpoint stands in for the remote service

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use verbox::ai::{
    AssistantError, AssistantResult, CLEARED_GREETING, Conversation, GENERIC_ERROR,
    GenerativeApi, SPEECH_RATE, SYSTEM_FRAMING, reply_to,
};
use verbox::capabilities::{CapabilityError, ClipboardWriter, SpeechSynthesizer};
use verbox::types::{Rating, Role};

enum Script {
    Reply(&'static str),
    ServiceDown,
    Malformed,
    Garbled,
}

struct FakeGenerator {
    script: Script,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeApi for FakeGenerator {
    async fn generate(&self, prompt: &str) -> AssistantResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script {
            Script::Reply(text) => Ok(text.to_string()),
            Script::ServiceDown => Err(AssistantError::Service(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            )),
            Script::Malformed => Err(AssistantError::Malformed("no candidates".to_string())),
            Script::Garbled => Err(serde_json::from_str::<serde_json::Value>("{not json")
                .unwrap_err()
                .into()),
        }
    }
}

#[derive(Default)]
struct FakeClipboard {
    contents: Option<String>,
    broken: bool,
}

impl ClipboardWriter for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError> {
        if self.broken {
            return Err(CapabilityError::Clipboard("no display".to_string()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct FakeSpeech {
    spoken: Mutex<Vec<(String, f32)>>,
}

impl SpeechSynthesizer for FakeSpeech {
    fn speak(&self, text: &str, rate: f32) {
        self.spoken.lock().unwrap().push((text.to_string(), rate));
    }
}

fn as_api(fake: &Arc<FakeGenerator>) -> Arc<dyn GenerativeApi> {
    Arc::clone(fake) as Arc<dyn GenerativeApi>
}

mod routing_tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_meaning_reply() {
        let reply = reply_to(None, "What does \"lucid\" mean?").await;
        assert!(reply.contains("lucid"), "{reply}");
        assert!(reply.contains("Search"), "{reply}");
    }

    #[tokio::test]
    async fn test_image_request_never_reaches_service() {
        let fake = FakeGenerator::new(Script::Reply("unused"));
        let reply = reply_to(Some(fake.as_ref()), "draw a sunset").await;

        assert_eq!(fake.calls(), 0);
        assert!(reply.contains("sunset"), "{reply}");
        assert!(reply.contains("only work with text"), "{reply}");
    }

    #[tokio::test]
    async fn test_image_request_without_credential() {
        let reply = reply_to(None, "show me a picture of a lighthouse").await;
        assert!(reply.contains("lighthouse"), "{reply}");
    }

    #[tokio::test]
    async fn test_service_reply_is_returned_verbatim() {
        let fake = FakeGenerator::new(Script::Reply("Lucid means clear."));
        let reply = reply_to(Some(fake.as_ref()), "define lucid").await;

        assert_eq!(reply, "Lucid means clear.");
        let prompts = fake.prompts.lock().unwrap();
        assert!(prompts[0].starts_with(SYSTEM_FRAMING));
        assert!(prompts[0].ends_with("User question: define lucid"));
    }

    #[tokio::test]
    async fn test_service_failure_is_explained_without_fallback() {
        let fake = FakeGenerator::new(Script::ServiceDown);
        let reply = reply_to(Some(fake.as_ref()), "What does \"lucid\" mean?").await;

        assert_eq!(fake.calls(), 1);
        assert!(reply.starts_with("I encountered an issue with the AI service"), "{reply}");
        assert!(reply.contains("503"), "{reply}");
        assert!(!reply.contains("look up \"lucid\""), "{reply}");
    }

    #[tokio::test]
    async fn test_malformed_response_is_a_service_failure() {
        let fake = FakeGenerator::new(Script::Malformed);
        let reply = reply_to(Some(fake.as_ref()), "hello").await;
        assert!(reply.contains("no candidates"), "{reply}");
    }

    #[tokio::test]
    async fn test_unexpected_error_becomes_generic_apology() {
        let fake = FakeGenerator::new(Script::Garbled);
        assert_eq!(reply_to(Some(fake.as_ref()), "hello").await, GENERIC_ERROR);
    }
}

mod conversation_tests {
    use super::*;

    #[tokio::test]
    async fn test_send_appends_user_then_assistant() {
        let fake = FakeGenerator::new(Script::Reply("Sure!"));
        let mut chat = Conversation::new(Some(as_api(&fake)));

        assert!(chat.send_message("give me a word").await);
        let messages = chat.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "give me a word");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "Sure!");
        assert!(!chat.is_waiting());
        assert!(messages[1].id < messages[2].id);
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let fake = FakeGenerator::new(Script::Reply("unused"));
        let mut chat = Conversation::new(Some(as_api(&fake)));

        assert!(!chat.send_message("  \n ").await);
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_waiting_clears_after_failure() {
        let fake = FakeGenerator::new(Script::Garbled);
        let mut chat = Conversation::new(Some(as_api(&fake)));

        chat.send_message("hello").await;
        assert!(!chat.is_waiting());
        assert_eq!(chat.messages().last().unwrap().content, GENERIC_ERROR);
        assert!(chat.send_message("again").await);
    }

    #[tokio::test]
    async fn test_clear_chat_resets_transcript() {
        let mut chat = Conversation::new(None);
        chat.send_message("hi there").await;
        let answer = chat.messages()[2].id;
        chat.rate(answer, Rating::Up);

        chat.clear_chat();
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].content, CLEARED_GREETING);
        assert_eq!(chat.rating(answer), None);
        assert!(chat.is_fresh());
    }

    #[tokio::test]
    async fn test_copy_message_writes_clipboard() {
        let mut chat = Conversation::new(None);
        chat.send_message("hello").await;
        let answer = chat.messages()[2].clone();
        let mut clipboard = FakeClipboard::default();

        assert!(chat.copy_message(answer.id, &mut clipboard).unwrap());
        assert_eq!(clipboard.contents.as_deref(), Some(answer.content.as_str()));
        assert!(!chat.copy_message(u64::MAX, &mut clipboard).unwrap());
    }

    #[tokio::test]
    async fn test_copy_failure_is_reported() {
        let chat = Conversation::new(None);
        let id = chat.messages()[0].id;
        let mut clipboard = FakeClipboard {
            broken: true,
            ..Default::default()
        };
        assert!(matches!(
            chat.copy_message(id, &mut clipboard),
            Err(CapabilityError::Clipboard(_))
        ));
    }

    #[test]
    fn test_speak_message_reads_content() {
        let chat = Conversation::new(None);
        let greeting = &chat.messages()[0];
        let speech = FakeSpeech::default();

        assert!(chat.speak_message(greeting.id, &speech));
        assert!(!chat.speak_message(u64::MAX, &speech));
        assert_eq!(
            *speech.spoken.lock().unwrap(),
            [(greeting.content.clone(), SPEECH_RATE)]
        );
    }
}
