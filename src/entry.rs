//! Dictionary entry model.
//!
//! The upstream schema is not contractually guaranteed, so every field the
//! app reads is optional or defaulted, and fields it does not know about are
//! carried through untouched so a stored bookmark round-trips as-is.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phonetics: Vec<Phonetic>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meanings: Vec<Meaning>,
    /// Milliseconds since the Unix epoch, stamped when bookmarked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Phonetic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    #[serde(default, deserialize_with = "null_as_default")]
    pub part_of_speech: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub definitions: Vec<Definition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub synonyms: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub antonyms: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub synonyms: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub antonyms: Vec<String>,
}

impl WordEntry {
    /// First pronunciation with a non-empty audio URL.
    pub fn audio_url(&self) -> Option<&str> {
        self.phonetics
            .iter()
            .filter_map(|phonetic| phonetic.audio.as_deref())
            .find(|url| !url.trim().is_empty())
    }

    pub fn primary_part_of_speech(&self) -> &str {
        self.meanings
            .first()
            .map(|meaning| meaning.part_of_speech.as_str())
            .unwrap_or("")
    }

    pub fn primary_definition(&self) -> Option<&str> {
        self.meanings
            .first()
            .and_then(|meaning| meaning.definitions.first())
            .map(|definition| definition.definition.as_str())
    }

    pub fn definitions(&self) -> impl Iterator<Item = &str> {
        self.meanings
            .iter()
            .flat_map(|meaning| meaning.definitions.iter())
            .map(|definition| definition.definition.as_str())
    }

    pub fn has_part_of_speech(&self, part_of_speech: &str) -> bool {
        self.meanings
            .iter()
            .any(|meaning| meaning.part_of_speech == part_of_speech)
    }
}
