//! Host capabilities the core reaches for side effects.
//!
//! Each one is a narrow trait so the flows stay testable without a real
//! audio device, clipboard or download folder.

use std::path::PathBuf;
use std::{fs, io};

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Failed to save file: {0}")]
    Io(#[from] io::Error),
}

/// Fire-and-forget playback of a pronunciation URL
pub trait AudioPlayer: Send + Sync {
    fn play(&self, url: &str);
}

/// Reads text aloud. `rate` is relative to normal speed (1.0).
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, rate: f32);
}

pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError>;
}

pub trait FileDownloader {
    /// Deliver `bytes` to the user under `file_name`, returning where it went
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CapabilityError>;
}

/// System clipboard via arboard
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, CapabilityError> {
        let inner =
            arboard::Clipboard::new().map_err(|e| CapabilityError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| CapabilityError::Clipboard(e.to_string()))
    }
}

/// Writes downloads into a fixed directory
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The platform download folder, falling back to the working directory
    pub fn default_location() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}

impl FileDownloader for DirectoryDownloader {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CapabilityError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "file saved");
        Ok(path)
    }
}
