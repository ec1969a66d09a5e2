//! Player preferences
//!
//! Persisted separately from game progress under their own store key.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background music
    pub music_on: bool,
    /// Haptic feedback cues
    pub haptics_on: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_on: true,
            haptics_on: true,
        }
    }
}

impl Settings {
    /// Store key
    pub const STORAGE_KEY: &'static str = "settings";

    /// Load settings, falling back to defaults when nothing is stored
    pub fn load(storage: &Storage) -> Self {
        match storage.load(Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &Storage) {
        storage.persist(Self::STORAGE_KEY, self);
        log::info!("Settings saved");
    }

    pub fn toggle_music(&mut self) -> bool {
        self.music_on = !self.music_on;
        self.music_on
    }

    pub fn toggle_haptics(&mut self) -> bool {
        self.haptics_on = !self.haptics_on;
        self.haptics_on
    }
}
