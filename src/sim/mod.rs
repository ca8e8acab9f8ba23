//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed-time driven, no wall clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod events;
pub mod levels;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::Aabb;
pub use events::{EventBus, EventKind, GameEvent, HandlerId};
pub use levels::{Difficulty, LEVELS, LevelTier, level_for_score, max_level, tier_for_level};
pub use spawner::{SpawnTimer, Spawner};
pub use state::{BEST_SCORE_KEY, GamePhase, GameState};
pub use tick::{TickInput, TickReport, sync_level, tick};
pub use world::{Avatar, Entity, EntityKind, World};
