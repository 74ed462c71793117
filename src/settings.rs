//! Display preferences
//!
//! Persisted separately from best times in LocalStorage (web) or on disk
//! (native).

use serde::{Deserialize, Serialize};

/// Display preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Show control hints under the HUD
    pub show_hints: bool,
    /// Show FPS counter
    pub show_fps: bool,
    /// Minimize hit flashes and kill effects
    pub reduced_flash: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_hints: true,
            show_fps: false,
            reduced_flash: false,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "red_swarm_settings";

    /// File name under the current directory (used only on native)
    #[allow(dead_code)]
    const FILE_NAME: &'static str = "red_swarm_settings.json";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from disk (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::fs::read_to_string(Self::FILE_NAME) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable settings file: {e}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk (native only); best-effort
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            if let Err(e) = std::fs::write(Self::FILE_NAME, json) {
                log::warn!("Could not save settings: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.show_hints, settings.show_hints);
        assert_eq!(back.show_fps, settings.show_fps);
        assert_eq!(back.reduced_flash, settings.reduced_flash);
    }
}
