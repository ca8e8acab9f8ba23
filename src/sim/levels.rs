//! Difficulty tiers
//!
//! Static, ordered table of spawn tunables. Lookups are pure and clamp
//! out-of-range requests to the first or last tier.

use serde::Serialize;

/// Difficulty label of a tier (ordinal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }
}

/// One row of the level table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelTier {
    pub level: u32,
    pub difficulty: Difficulty,
    /// Minimum cumulative score to enter this tier
    pub score_threshold: u64,
    pub obstacle_spawn_interval_ms: u32,
    pub obstacle_spawn_probability: f32,
    /// Fall speed in pixels per second
    pub obstacle_speed: f32,
    pub coin_spawn_interval_ms: u32,
    pub coin_spawn_probability: f32,
    pub coin_speed: f32,
}

/// The level table, sorted by ascending `score_threshold`
pub const LEVELS: [LevelTier; 8] = [
    LevelTier {
        level: 1,
        difficulty: Difficulty::Easy,
        score_threshold: 0,
        obstacle_spawn_interval_ms: 1400,
        obstacle_spawn_probability: 0.55,
        obstacle_speed: 140.0,
        coin_spawn_interval_ms: 1800,
        coin_spawn_probability: 0.70,
        coin_speed: 120.0,
    },
    LevelTier {
        level: 2,
        difficulty: Difficulty::Easy,
        score_threshold: 150,
        obstacle_spawn_interval_ms: 1250,
        obstacle_spawn_probability: 0.60,
        obstacle_speed: 160.0,
        coin_spawn_interval_ms: 1700,
        coin_spawn_probability: 0.70,
        coin_speed: 130.0,
    },
    LevelTier {
        level: 3,
        difficulty: Difficulty::Medium,
        score_threshold: 350,
        obstacle_spawn_interval_ms: 1100,
        obstacle_spawn_probability: 0.65,
        obstacle_speed: 185.0,
        coin_spawn_interval_ms: 1600,
        coin_spawn_probability: 0.72,
        coin_speed: 145.0,
    },
    LevelTier {
        level: 4,
        difficulty: Difficulty::Medium,
        score_threshold: 600,
        obstacle_spawn_interval_ms: 950,
        obstacle_spawn_probability: 0.70,
        obstacle_speed: 210.0,
        coin_spawn_interval_ms: 1500,
        coin_spawn_probability: 0.75,
        coin_speed: 160.0,
    },
    LevelTier {
        level: 5,
        difficulty: Difficulty::Hard,
        score_threshold: 900,
        obstacle_spawn_interval_ms: 820,
        obstacle_spawn_probability: 0.75,
        obstacle_speed: 240.0,
        coin_spawn_interval_ms: 1400,
        coin_spawn_probability: 0.78,
        coin_speed: 175.0,
    },
    LevelTier {
        level: 6,
        difficulty: Difficulty::Hard,
        score_threshold: 1300,
        obstacle_spawn_interval_ms: 700,
        obstacle_spawn_probability: 0.80,
        obstacle_speed: 270.0,
        coin_spawn_interval_ms: 1300,
        coin_spawn_probability: 0.80,
        coin_speed: 190.0,
    },
    LevelTier {
        level: 7,
        difficulty: Difficulty::Expert,
        score_threshold: 1800,
        obstacle_spawn_interval_ms: 600,
        obstacle_spawn_probability: 0.85,
        obstacle_speed: 305.0,
        coin_spawn_interval_ms: 1200,
        coin_spawn_probability: 0.82,
        coin_speed: 210.0,
    },
    LevelTier {
        level: 8,
        difficulty: Difficulty::Expert,
        score_threshold: 2500,
        obstacle_spawn_interval_ms: 500,
        obstacle_spawn_probability: 0.90,
        obstacle_speed: 340.0,
        coin_spawn_interval_ms: 1100,
        coin_spawn_probability: 0.85,
        coin_speed: 230.0,
    },
];

/// Highest defined level number
pub fn max_level() -> u32 {
    LEVELS[LEVELS.len() - 1].level
}

/// Tier for a level number, clamped into the table
pub fn tier_for_level(level: impl Into<i64>) -> &'static LevelTier {
    let level = level.into();
    let first = LEVELS[0].level as i64;
    let last = max_level() as i64;
    let clamped = level.clamp(first, last);
    // Level numbers are contiguous from the first tier
    &LEVELS[(clamped - first) as usize]
}

/// Highest level whose threshold is at or below `score` (level 1 if none)
pub fn level_for_score(score: u64) -> u32 {
    LEVELS
        .iter()
        .rev()
        .find(|tier| tier.score_threshold <= score)
        .map(|tier| tier.level)
        .unwrap_or(1)
}
