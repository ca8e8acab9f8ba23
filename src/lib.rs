//! Key Dash - dodge falling obstacles, collect falling coins
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state, level table, spawner, frame tick)
//! - `input`: Key bindings to per-frame intents
//! - `persistence`: Synchronous key-value storage backends
//! - `platform`: Browser/native time and logging
//! - `settings`: Player preferences
//! - `leaderboard`: Local top scores
//! - `scoring`: Final-score hand-off to the remote scoreboard
//! - `game`: Run lifecycle and fixed-step driver

pub mod game;
pub mod input;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod scoring;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use leaderboard::Leaderboard;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Avatar defaults
    pub const AVATAR_WIDTH: f32 = 48.0;
    pub const AVATAR_HEIGHT: f32 = 48.0;
    /// Avatar movement speed (pixels/s)
    pub const AVATAR_SPEED: f32 = 320.0;
    /// Gap between avatar and bottom edge at spawn
    pub const AVATAR_BOTTOM_MARGIN: f32 = 24.0;
    /// Hitbox scale for obstacle hits (a little forgiving)
    pub const AVATAR_HITBOX_SCALE: f32 = 0.8;

    /// Falling entity sizes
    pub const OBSTACLE_SIZE: f32 = 40.0;
    pub const COIN_SIZE: f32 = 28.0;

    /// Points per collected coin, flat across all tiers
    pub const COIN_VALUE: i64 = 10;
}
