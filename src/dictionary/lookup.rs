use super::{DictionaryApi, DictionaryApiError};
use crate::capabilities::AudioPlayer;
use crate::entry::WordEntry;
use std::sync::Arc;

/// Recoverable lookup failures. `Display` is the message shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Please enter a word.")]
    EmptyQuery,

    #[error("Word not found. Try another one.")]
    WordNotFound,

    #[error("Audio not available for this word.")]
    AudioUnavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupState {
    Idle,
    Loading,
    Success,
    NotFound,
}

/// An issued request. Only the most recently issued ticket may update the
/// displayed entry.
#[derive(Debug)]
pub struct LookupTicket {
    seq: u64,
    word: String,
}

impl LookupTicket {
    pub fn word(&self) -> &str {
        &self.word
    }
}

pub struct LookupFlow {
    api: Arc<dyn DictionaryApi>,
    current: Option<WordEntry>,
    error: Option<LookupError>,
    issued: u64,
    loading: bool,
}

impl LookupFlow {
    pub fn new(api: Arc<dyn DictionaryApi>) -> Self {
        Self {
            api,
            current: None,
            error: None,
            issued: 0,
            loading: false,
        }
    }

    pub fn api(&self) -> Arc<dyn DictionaryApi> {
        Arc::clone(&self.api)
    }

    pub fn current(&self) -> Option<&WordEntry> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<LookupError> {
        self.error
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> LookupState {
        if self.loading {
            LookupState::Loading
        } else if self.current.is_some() {
            LookupState::Success
        } else if self.error == Some(LookupError::WordNotFound) {
            LookupState::NotFound
        } else {
            LookupState::Idle
        }
    }

    /// Look up `raw` and apply the result.
    pub async fn search_word(&mut self, raw: &str) -> Result<(), LookupError> {
        let ticket = self.begin(raw)?;
        let result = self.api.fetch(ticket.word()).await;
        if self.complete(ticket, result) {
            match self.error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        } else {
            Ok(())
        }
    }

    /// Validate input and issue a ticket. Blank input is rejected without
    /// touching the displayed entry.
    pub fn begin(&mut self, raw: &str) -> Result<LookupTicket, LookupError> {
        let word = raw.trim();
        if word.is_empty() {
            self.error = Some(LookupError::EmptyQuery);
            return Err(LookupError::EmptyQuery);
        }

        self.issued += 1;
        self.loading = true;
        self.error = None;
        tracing::info!(word, seq = self.issued, "lookup started");

        Ok(LookupTicket {
            seq: self.issued,
            word: word.to_string(),
        })
    }

    /// Apply a finished request. Returns `false` when a newer lookup has been
    /// issued since and the result was dropped.
    pub fn complete(
        &mut self,
        ticket: LookupTicket,
        result: Result<Vec<WordEntry>, DictionaryApiError>,
    ) -> bool {
        if ticket.seq != self.issued {
            tracing::debug!(
                word = %ticket.word,
                seq = ticket.seq,
                latest = self.issued,
                "stale lookup dropped"
            );
            return false;
        }

        self.loading = false;
        match result.map(|entries| entries.into_iter().next()) {
            Ok(Some(entry)) => {
                tracing::info!(word = %entry.word, "lookup succeeded");
                self.current = Some(entry);
                self.error = None;
            }
            Ok(None) => self.not_found(&ticket.word, "empty result"),
            Err(err) => self.not_found(&ticket.word, &err.to_string()),
        }
        true
    }

    fn not_found(&mut self, word: &str, reason: &str) {
        tracing::warn!(word, reason, "lookup failed");
        self.current = None;
        self.error = Some(LookupError::WordNotFound);
    }

    /// Show an already-saved entry without a network round trip. Supersedes
    /// any lookup still in flight.
    pub fn select_bookmark(&mut self, entry: WordEntry) {
        self.issued += 1;
        self.loading = false;
        self.error = None;
        self.current = Some(entry);
    }

    /// Play the first pronunciation that has an audio URL.
    pub fn play_audio(&mut self, player: &dyn AudioPlayer) -> Result<(), LookupError> {
        match self.current.as_ref().and_then(WordEntry::audio_url) {
            Some(url) => {
                tracing::debug!(url, "playing pronunciation");
                player.play(url);
                Ok(())
            }
            None => {
                self.error = Some(LookupError::AudioUnavailable);
                Err(LookupError::AudioUnavailable)
            }
        }
    }
}
