//! Key-value persistence for bookmarks and preferences
//!
//! This module provides:
//! - The `KeyValueStore` capability the core is handed explicitly
//! - A file-backed store (one JSON file per key) for native hosts
//! - An in-memory store for tests and hosts without a filesystem

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::{fs, io};

pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const THEME_KEY: &str = "darkMode";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to write to storage: {0}")]
    Io(#[from] io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String-valued persistent storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written or is unreadable
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing whatever was stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ============================================
// File Backend
// ============================================

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform's local data directory
    pub fn default_location() -> Self {
        Self::new(default_data_dir())
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        tracing::debug!(key, bytes = value.len(), "persisted");
        Ok(())
    }
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("verbox");
    }

    PathBuf::from("cache").join("verbox")
}

/// Sanitize storage key for filesystem use
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}

// ============================================
// Memory Backend
// ============================================

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
