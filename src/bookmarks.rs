//! Saved words: the persisted collection plus the search/filter/sort view
//! the bookmarks screen renders.

use crate::capabilities::{CapabilityError, FileDownloader};
use crate::entry::WordEntry;
use crate::storage::{BOOKMARKS_KEY, KeyValueStore};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const EXPORT_FILE_NAME: &str = "verbox-bookmarks.json";

const PREVIEW_CHARS: usize = 60;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize bookmarks: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Save(#[from] CapabilityError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PartOfSpeechFilter {
    #[default]
    All,
    Only(String),
}

impl PartOfSpeechFilter {
    /// `"all"` is the wildcard, anything else is an exact part of speech
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" | "" => Self::All,
            other => Self::Only(other.to_string()),
        }
    }

    fn matches(&self, entry: &WordEntry) -> bool {
        match self {
            Self::All => true,
            Self::Only(part_of_speech) => entry.has_part_of_speech(part_of_speech),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    Word,
    #[default]
    Date,
    PartOfSpeech,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookmarkQuery {
    pub search: String,
    pub part_of_speech: PartOfSpeechFilter,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

impl BookmarkQuery {
    pub fn new(
        search: impl Into<String>,
        part_of_speech: PartOfSpeechFilter,
        sort_key: SortKey,
        direction: SortDirection,
    ) -> Self {
        Self {
            search: search.into(),
            part_of_speech,
            sort_key,
            direction,
        }
    }

    fn matches(&self, entry: &WordEntry, needle: &str) -> bool {
        let text_match = needle.is_empty()
            || entry.word.to_lowercase().contains(needle)
            || entry
                .definitions()
                .any(|definition| definition.to_lowercase().contains(needle));
        text_match && self.part_of_speech.matches(entry)
    }

    fn compare(&self, a: &WordEntry, b: &WordEntry) -> Ordering {
        match self.sort_key {
            SortKey::Word => locale_cmp(&a.word, &b.word),
            SortKey::Date => a.date_added.unwrap_or(0).cmp(&b.date_added.unwrap_or(0)),
            SortKey::PartOfSpeech => {
                locale_cmp(a.primary_part_of_speech(), b.primary_part_of_speech())
            }
        }
    }
}

/// Dictionary order: accents and case are ignored first ("élan" sits beside
/// "elan", not after "z"), then case-folded text, then raw code points, so
/// distinct strings never compare equal. Not a full collation table.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// One-line list preview: part of speech and a truncated first definition
pub fn preview(entry: &WordEntry) -> String {
    let definition = entry.primary_definition().unwrap_or_default();
    let truncated: String = definition.chars().take(PREVIEW_CHARS).collect();
    format!("{} • {}...", entry.primary_part_of_speech(), truncated)
}

/// Serialize a view for download. Order is preserved.
pub fn export(view: &[WordEntry]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(view)
}

pub struct Bookmarks {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<WordEntry>,
    selected: BTreeSet<String>,
}

impl Bookmarks {
    /// Load the saved collection. Missing or corrupt data yields an empty one;
    /// a single unreadable element is skipped without losing the rest.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.get(BOOKMARKS_KEY) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Value>>(&raw) {
                Ok(values) => dedup_by_word(values.into_iter().filter_map(read_entry).collect()),
                Err(err) => {
                    tracing::warn!("stored bookmarks are unreadable, starting empty: {err}");
                    Vec::new()
                }
            },
        };
        tracing::debug!(count = entries.len(), "bookmarks loaded");

        Self {
            store,
            entries,
            selected: BTreeSet::new(),
        }
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.iter().any(|entry| entry.word == word)
    }

    pub fn get(&self, word: &str) -> Option<&WordEntry> {
        self.entries.iter().find(|entry| entry.word == word)
    }

    /// Append unless the word is already saved. Returns whether it was added.
    pub fn add(&mut self, mut entry: WordEntry) -> bool {
        if self.contains(&entry.word) {
            return false;
        }
        if entry.date_added.is_none() {
            entry.date_added = Some(now_millis());
        }
        tracing::info!(word = %entry.word, "bookmark added");
        self.entries.push(entry);
        self.persist();
        true
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, word: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.word != word);
        self.selected.remove(word);
        if self.entries.len() == before {
            return false;
        }
        tracing::info!(word, "bookmark removed");
        self.persist();
        true
    }

    /// Bookmark or unbookmark. Returns whether the word is saved afterwards.
    pub fn toggle(&mut self, entry: &WordEntry) -> bool {
        if self.contains(&entry.word) {
            self.remove(&entry.word);
            false
        } else {
            self.add(entry.clone());
            true
        }
    }

    pub fn query(&self, query: &BookmarkQuery) -> Vec<WordEntry> {
        let needle = query.search.trim().to_lowercase();
        let mut view: Vec<WordEntry> = self
            .entries
            .iter()
            .filter(|entry| query.matches(entry, &needle))
            .cloned()
            .collect();

        // stable ascending sort, then reverse, so desc mirrors asc exactly
        view.sort_by(|a, b| query.compare(a, b));
        if query.direction == SortDirection::Desc {
            view.reverse();
        }
        view
    }

    /// Sorted distinct parts of speech across every saved meaning
    pub fn parts_of_speech(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| entry.meanings.iter())
            .map(|meaning| meaning.part_of_speech.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn export_to(
        &self,
        view: &[WordEntry],
        downloader: &dyn FileDownloader,
    ) -> Result<PathBuf, ExportError> {
        let bytes = export(view)?;
        Ok(downloader.save(EXPORT_FILE_NAME, &bytes)?)
    }

    // ---------------
    // Bulk selection
    // ---------------

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, word: &str) -> bool {
        self.selected.contains(word)
    }

    pub fn toggle_selected(&mut self, word: &str) {
        if !self.selected.remove(word) {
            self.selected.insert(word.to_string());
        }
    }

    /// Select every word in `view`, or clear the selection if that is
    /// already the case.
    pub fn toggle_select_all(&mut self, view: &[WordEntry]) {
        let all_selected =
            !view.is_empty() && view.iter().all(|entry| self.selected.contains(&entry.word));
        if all_selected {
            self.selected.clear();
        } else {
            self.selected = view.iter().map(|entry| entry.word.clone()).collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Remove every selected word. Returns how many entries were removed.
    pub fn delete_selected(&mut self) -> usize {
        let selected = std::mem::take(&mut self.selected);
        let before = self.entries.len();
        self.entries.retain(|entry| !selected.contains(&entry.word));
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::info!(removed, "bulk delete");
            self.persist();
        }
        removed
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.entries) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::error!("failed to serialize bookmarks: {err}");
                return;
            }
        };
        if let Err(err) = self.store.set(BOOKMARKS_KEY, &serialized) {
            tracing::warn!("failed to persist bookmarks: {err}");
        }
    }
}

fn read_entry(value: Value) -> Option<WordEntry> {
    serde_json::from_value(value)
        .map_err(|err| tracing::warn!("skipping unreadable bookmark: {err}"))
        .ok()
}

fn dedup_by_word(entries: Vec<WordEntry>) -> Vec<WordEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.word.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Definition, Meaning};
    use crate::storage::MemoryStore;

    fn entry(word: &str, part_of_speech: &str, definition: &str) -> WordEntry {
        WordEntry {
            word: word.to_string(),
            meanings: vec![Meaning {
                part_of_speech: part_of_speech.to_string(),
                definitions: vec![Definition {
                    definition: definition.to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn words(view: &[WordEntry]) -> Vec<&str> {
        view.iter().map(|entry| entry.word.as_str()).collect()
    }

    fn empty() -> Bookmarks {
        Bookmarks::load(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn add_stamps_date_once() {
        let mut bookmarks = empty();
        let mut dated = entry("cat", "noun", "feline");
        dated.date_added = Some(42);
        assert!(bookmarks.add(dated));
        assert!(bookmarks.add(entry("dog", "noun", "canine")));
        assert_eq!(bookmarks.get("cat").unwrap().date_added, Some(42));
        assert!(bookmarks.get("dog").unwrap().date_added.unwrap() > 42);
    }

    #[test]
    fn duplicate_words_are_ignored() {
        let mut bookmarks = empty();
        assert!(bookmarks.add(entry("cat", "noun", "feline")));
        assert!(!bookmarks.add(entry("cat", "verb", "to vomit")));
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks.get("cat").unwrap().primary_part_of_speech(), "noun");
    }

    #[test]
    fn search_is_case_insensitive_over_word_and_definitions() {
        let mut bookmarks = empty();
        bookmarks.add(entry("Lucid", "adjective", "expressed clearly"));
        bookmarks.add(entry("opaque", "adjective", "NOT able to be seen through"));

        let by_word = BookmarkQuery::new(
            "luc",
            PartOfSpeechFilter::All,
            SortKey::Word,
            SortDirection::Asc,
        );
        assert_eq!(words(&bookmarks.query(&by_word)), ["Lucid"]);

        let by_definition =
            BookmarkQuery::new("seen", PartOfSpeechFilter::All, SortKey::Word, SortDirection::Asc);
        assert_eq!(words(&bookmarks.query(&by_definition)), ["opaque"]);
    }

    #[test]
    fn word_sort_ignores_accents() {
        let mut bookmarks = empty();
        for word in ["zebra", "élan", "Eagle", "elan"] {
            bookmarks.add(entry(word, "noun", "x"));
        }
        let query = BookmarkQuery::new(
            "",
            PartOfSpeechFilter::All,
            SortKey::Word,
            SortDirection::Asc,
        );
        assert_eq!(words(&bookmarks.query(&query)), ["Eagle", "elan", "élan", "zebra"]);
    }

    #[test]
    fn part_of_speech_sort_treats_missing_as_empty() {
        let mut bookmarks = empty();
        bookmarks.add(entry("run", "verb", "move"));
        bookmarks.add(WordEntry {
            word: "bare".to_string(),
            ..Default::default()
        });
        bookmarks.add(entry("cat", "noun", "feline"));

        let query = BookmarkQuery::new(
            "",
            PartOfSpeechFilter::All,
            SortKey::PartOfSpeech,
            SortDirection::Asc,
        );
        assert_eq!(words(&bookmarks.query(&query)), ["bare", "cat", "run"]);
    }

    #[test]
    fn date_sort_treats_missing_as_epoch() {
        let store = Arc::new(MemoryStore::with_entry(
            BOOKMARKS_KEY,
            r#"[{"word":"new","dateAdded":20},{"word":"undated"},{"word":"old","dateAdded":10}]"#,
        ));
        let bookmarks = Bookmarks::load(store);
        let query = BookmarkQuery::default();
        assert_eq!(words(&bookmarks.query(&query)), ["new", "old", "undated"]);
    }

    #[test]
    fn parts_of_speech_are_sorted_and_distinct() {
        let mut bookmarks = empty();
        bookmarks.add(entry("run", "verb", "move"));
        bookmarks.add(entry("cat", "noun", "feline"));
        bookmarks.add(entry("dog", "noun", "canine"));
        assert_eq!(bookmarks.parts_of_speech(), ["noun", "verb"]);
    }

    #[test]
    fn load_deduplicates_stored_words() {
        let store = Arc::new(MemoryStore::with_entry(
            BOOKMARKS_KEY,
            r#"[{"word":"cat","dateAdded":1},{"word":"cat","dateAdded":2}]"#,
        ));
        let bookmarks = Bookmarks::load(store);
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks.get("cat").unwrap().date_added, Some(1));
    }

    #[test]
    fn select_all_toggles_over_view() {
        let mut bookmarks = empty();
        bookmarks.add(entry("cat", "noun", "feline"));
        bookmarks.add(entry("run", "verb", "move"));
        let nouns = bookmarks.query(&BookmarkQuery {
            part_of_speech: PartOfSpeechFilter::parse("noun"),
            ..Default::default()
        });

        bookmarks.toggle_select_all(&nouns);
        assert!(bookmarks.is_selected("cat"));
        assert!(!bookmarks.is_selected("run"));

        bookmarks.toggle_select_all(&nouns);
        assert!(bookmarks.selected().is_empty());
    }

    #[test]
    fn delete_selected_clears_selection() {
        let mut bookmarks = empty();
        bookmarks.add(entry("cat", "noun", "feline"));
        bookmarks.add(entry("dog", "noun", "canine"));
        bookmarks.add(entry("run", "verb", "move"));
        bookmarks.toggle_selected("cat");
        bookmarks.toggle_selected("run");

        assert_eq!(bookmarks.delete_selected(), 2);
        assert_eq!(words(bookmarks.entries()), ["dog"]);
        assert!(bookmarks.selected().is_empty());
    }

    #[test]
    fn remove_drops_selection_too() {
        let mut bookmarks = empty();
        bookmarks.add(entry("cat", "noun", "feline"));
        bookmarks.toggle_selected("cat");
        assert!(bookmarks.remove("cat"));
        assert!(!bookmarks.is_selected("cat"));
        assert!(!bookmarks.remove("cat"));
    }

    #[test]
    fn preview_truncates_definition() {
        let long = "a".repeat(80);
        let text = preview(&entry("cat", "noun", &long));
        assert_eq!(text, format!("noun • {}...", "a".repeat(60)));
    }
}
