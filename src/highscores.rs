//! Best survival times leaderboard
//!
//! Persisted to LocalStorage on the web and to a JSON file on native,
//! tracks the top 8 runs by survival time.

use serde::{Deserialize, Serialize};

/// Maximum number of best times to keep
pub const MAX_BEST_TIMES: usize = 8;

/// A single leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestTimeEntry {
    /// Survival time in seconds, rounded to one decimal
    pub seconds: f32,
    /// Level the run ended on
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Best survival times, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BestTimes {
    pub entries: Vec<BestTimeEntry>,
}

impl BestTimes {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "red_swarm_best_times";

    /// File name under the current directory (used only on native)
    #[allow(dead_code)]
    const FILE_NAME: &'static str = "red_swarm_best_times.json";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a survival time qualifies for the leaderboard
    pub fn qualifies(&self, seconds: f32) -> bool {
        if seconds <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_BEST_TIMES {
            return true;
        }
        self.entries
            .last()
            .map(|e| seconds > e.seconds)
            .unwrap_or(true)
    }

    /// Record a finished run.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn record(&mut self, seconds: f32, level: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(seconds) {
            return None;
        }

        let entry = BestTimeEntry {
            seconds,
            level,
            timestamp,
        };

        // Insertion point, sorted descending by time
        let pos = self.entries.iter().position(|e| seconds > e.seconds);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_BEST_TIMES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored data is untrusted: drop non-positive or non-finite entries,
    /// restore descending order, and re-apply the cap
    fn sanitize(&mut self) {
        self.entries
            .retain(|e| e.seconds.is_finite() && e.seconds > 0.0);
        self.entries
            .sort_by(|a, b| b.seconds.total_cmp(&a.seconds));
        self.entries.truncate(MAX_BEST_TIMES);
    }

    /// Longest recorded run (if any)
    pub fn best(&self) -> Option<f32> {
        self.entries.first().map(|e| e.seconds)
    }

    /// Load best times from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(mut times) = serde_json::from_str::<BestTimes>(&json) {
                    times.sanitize();
                    log::info!("Loaded {} best times", times.entries.len());
                    return times;
                }
            }
        }

        log::info!("No best times found, starting fresh");
        Self::new()
    }

    /// Save best times to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Best times saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Load best times from disk (native only); corrupt or missing files
    /// fall back to an empty leaderboard
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::fs::read_to_string(Self::FILE_NAME) {
            Ok(json) => match serde_json::from_str::<BestTimes>(&json) {
                Ok(mut times) => {
                    times.sanitize();
                    log::info!("Loaded {} best times", times.entries.len());
                    times
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable best times file: {e}");
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No best times found, starting fresh");
                Self::new()
            }
        }
    }

    /// Save best times to disk (native only); best-effort
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            if let Err(e) = std::fs::write(Self::FILE_NAME, json) {
                log::warn!("Could not save best times: {e}");
            } else {
                log::info!("Best times saved ({} entries)", self.entries.len());
            }
        }
    }
}
