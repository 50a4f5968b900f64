use crate::storage::{KeyValueStore, THEME_KEY};
use std::sync::Arc;

const ENABLED: &str = "enabled";
const DISABLED: &str = "disabled";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn css_class(self) -> &'static str {
        match self {
            ThemeMode::Light => "",
            ThemeMode::Dark => "dark-mode",
        }
    }
}

/// Persisted dark-mode flag
pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
    dark: bool,
}

impl ThemePreference {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let dark = store.get(THEME_KEY).as_deref() == Some(ENABLED);
        Self { store, dark }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn mode(&self) -> ThemeMode {
        if self.dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark = dark;
        let value = if dark { ENABLED } else { DISABLED };
        if let Err(err) = self.store.set(THEME_KEY, value) {
            tracing::warn!("failed to persist theme: {err}");
        }
    }

    pub fn toggle(&mut self) -> ThemeMode {
        self.set_dark_mode(!self.dark);
        self.mode()
    }
}
