//! Player preferences
//!
//! Persisted as one JSON blob in the key-value store, next to the high scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Outline player and obstacle hitboxes
    pub show_hitboxes: bool,
    /// Speed readout in the top-left corner
    pub show_speed: bool,
    /// Draw dust behind the rear wheel
    pub dust_particles: bool,
    /// Version label in the corner
    pub show_version: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_hitboxes: false,
            show_speed: false,
            dust_particles: true,
            show_version: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "motorcycleSettings";

    /// Debug preset: hitboxes and speed readout on
    pub fn debug() -> Self {
        Self {
            show_hitboxes: true,
            show_speed: true,
            ..Self::default()
        }
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Some(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings: {}", e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
