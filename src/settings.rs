//! Player settings and preferences
//!
//! Persisted as JSON in the key-value store, separate from scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};

/// Default scoreboard service
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Longest accepted player name (characters)
pub const MAX_PLAYER_NAME_LEN: usize = 50;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name sent with submitted scores
    pub player_name: String,
    /// Send final scores to the remote scoreboard
    pub submit_scores: bool,
    /// Scoreboard base URL (without `/api`)
    pub api_base_url: String,
    /// Level each new run starts at
    pub starting_level: u32,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Demo ===
    /// Let the autopilot play
    pub autopilot: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            submit_scores: true,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            starting_level: 1,
            show_fps: false,
            autopilot: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "key_dash_settings";

    /// Load settings, falling back to defaults on a missing or corrupt entry
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let settings: Settings = persistence::load_json(store, Self::STORAGE_KEY);
        settings.sanitized()
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        if persistence::save_json(store, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }

    /// Clamp values a hand-edited entry could push out of range
    pub fn sanitized(mut self) -> Self {
        self.starting_level = self.starting_level.max(1);
        self.player_name = self.player_name.trim().to_string();
        if self.player_name.chars().count() > MAX_PLAYER_NAME_LEN {
            self.player_name = self.player_name.chars().take(MAX_PLAYER_NAME_LEN).collect();
        }
        if self.player_name.is_empty() {
            self.player_name = Settings::default().player_name;
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }

    /// Endpoint receiving final scores
    pub fn scores_url(&self) -> String {
        format!("{}/api/highscores", self.api_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_missing_settings_use_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_settings_persist() {
        let store = MemoryStore::new();
        let settings = Settings {
            player_name: "Alice".into(),
            starting_level: 3,
            ..Default::default()
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_entry_fills_defaults() {
        let store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"player_name":"Bob"}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.player_name, "Bob");
        assert_eq!(settings.starting_level, 1);
        assert!(settings.submit_scores);
    }

    #[test]
    fn test_sanitize() {
        let settings = Settings {
            player_name: "   ".into(),
            starting_level: 0,
            api_base_url: "https://scores.example/".into(),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.player_name, "Player");
        assert_eq!(settings.starting_level, 1);
        assert_eq!(settings.scores_url(), "https://scores.example/api/highscores");

        let long = Settings {
            player_name: "x".repeat(80),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(long.player_name.len(), MAX_PLAYER_NAME_LEN);
    }
}
