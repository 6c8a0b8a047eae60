//! # Preference Store
//!
//! The light/dark theme, persisted under the `theme` key. Loading never
//! fails: missing or unreadable storage means `light`.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::storage::{KeyValueStore, MemoryStore};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }
}

/// Whatever displays the theme: a document-level attribute plus the toggle.
pub trait ThemeSurface {
    fn set_theme_attribute(&mut self, theme: Theme);
    fn set_toggle_checked(&mut self, checked: bool);
}

/// State of the toggle control after the user flipped it. Checked means dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleEvent {
    pub checked: bool,
}

impl ToggleEvent {
    pub fn desired_theme(&self) -> Theme {
        if self.checked { Theme::Dark } else { Theme::Light }
    }
}

pub struct PreferenceStore {
    storage: Box<dyn KeyValueStore>,
    current: Theme,
}

impl PreferenceStore {
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            current: Theme::default(),
        }
    }

    /// Preferences that live only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn theme(&self) -> Theme {
        self.current
    }

    pub fn load(&mut self) -> Theme {
        self.current = match self.storage.get(THEME_KEY) {
            Ok(Some(value)) => Theme::parse(&value).unwrap_or_else(|| {
                warn!("Ignoring unknown stored theme {:?}", value);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Could not read preferences, using default theme: {}", e);
                Theme::default()
            }
        };
        info!("Theme loaded: {}", self.current.as_str());
        self.current
    }

    /// Push `theme` to the surface. Applying the same theme twice leaves the
    /// surface exactly as applying it once.
    pub fn apply(&mut self, theme: Theme, surface: &mut dyn ThemeSurface) {
        self.current = theme;
        surface.set_theme_attribute(theme);
        surface.set_toggle_checked(theme.is_dark());
    }

    pub fn toggle(&mut self, event: ToggleEvent, surface: &mut dyn ThemeSurface) -> Theme {
        let theme = event.desired_theme();
        self.apply(theme, surface);
        if let Err(e) = self.storage.set(THEME_KEY, theme.as_str()) {
            warn!("Could not persist theme: {}", e);
        } else {
            info!("Theme set to {}", theme.as_str());
        }
        theme
    }
}
