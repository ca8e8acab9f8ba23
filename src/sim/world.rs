//! Play field contents: the avatar, live falling entities, spawner and RNG

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::levels::tier_for_level;
use super::spawner::Spawner;
use crate::consts::*;

/// Kind of falling entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ends the run on contact
    Obstacle,
    /// Collected for points
    Coin,
}

impl EntityKind {
    pub fn size(&self) -> Vec2 {
        match self {
            EntityKind::Obstacle => Vec2::splat(OBSTACLE_SIZE),
            EntityKind::Coin => Vec2::splat(COIN_SIZE),
        }
    }
}

/// A falling obstacle or coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per second, fixed at spawn time
    pub fall_speed: f32,
}

impl Entity {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.kind.size())
    }

    pub fn fall(&mut self, dt: f32) {
        self.pos.y += self.fall_speed * dt;
    }

    /// Entirely below the bottom of the play field
    pub fn is_below_field(&self) -> bool {
        self.pos.y > FIELD_HEIGHT
    }
}

/// The player-controlled avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Default for Avatar {
    fn default() -> Self {
        let size = Vec2::new(AVATAR_WIDTH, AVATAR_HEIGHT);
        Self {
            pos: Vec2::new(
                (FIELD_WIDTH - size.x) / 2.0,
                FIELD_HEIGHT - size.y - AVATAR_BOTTOM_MARGIN,
            ),
            size,
        }
    }
}

impl Avatar {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    /// Region used against obstacles
    pub fn hitbox(&self) -> Aabb {
        self.bounds().shrunk(AVATAR_HITBOX_SCALE)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Move along `dir` (normalized if longer than 1) and clamp into the field
    pub fn move_by(&mut self, dir: Vec2, speed: f32, dt: f32) {
        let dir = if dir.length_squared() > 1.0 {
            dir.normalize()
        } else {
            dir
        };
        self.pos += dir * speed * dt;
        self.pos = self.pos.clamp(Vec2::ZERO, Vec2::new(FIELD_WIDTH, FIELD_HEIGHT) - self.size);
    }
}

/// Everything the frame tick moves, owned by whoever owns the run
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub avatar: Avatar,
    /// Live entities in spawn order
    pub entities: Vec<Entity>,
    pub spawner: Spawner,
    pub rng: Pcg32,
}

impl World {
    pub fn new(seed: u64, level: u32) -> Self {
        Self {
            seed,
            avatar: Avatar::default(),
            entities: Vec::new(),
            spawner: Spawner::new(tier_for_level(level)),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Fresh play field for a new run
    pub fn reset(&mut self, seed: u64, level: u32) {
        *self = Self::new(seed, level);
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }
}
