//! Time-driven spawn scheduler for obstacles and coins
//!
//! Two repeating timers advanced with the frame's elapsed time. Each fire
//! is one spawn attempt: skipped while paused (the fire is consumed, not
//! deferred), otherwise a probability roll decides whether an entity
//! appears above the top edge at a random x.

use glam::Vec2;
use rand::Rng;

use super::levels::LevelTier;
use super::world::{Entity, EntityKind};
use crate::consts::FIELD_WIDTH;

/// Repeating timer for one entity kind
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTimer {
    pub interval_ms: f32,
    pub probability: f32,
    /// Fall speed given to spawned entities (pixels/s)
    pub speed: f32,
    elapsed_ms: f32,
}

impl SpawnTimer {
    pub fn new(interval_ms: u32, probability: f32, speed: f32) -> Self {
        Self {
            // Zero interval would fire forever within one frame
            interval_ms: (interval_ms as f32).max(1.0),
            probability,
            speed,
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `dt_ms`, returning whether the timer fired.
    /// Fires at most once per call; intervals missed in a long stall are dropped.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        self.elapsed_ms += dt_ms.max(0.0);
        if self.elapsed_ms < self.interval_ms {
            return false;
        }
        self.elapsed_ms %= self.interval_ms;
        true
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }
}

#[derive(Debug, Clone)]
pub struct Spawner {
    obstacle: SpawnTimer,
    coin: SpawnTimer,
    /// Level of the tier the timers were built from
    level: u32,
    field_width: f32,
    next_id: u32,
}

impl Spawner {
    pub fn new(tier: &LevelTier) -> Self {
        let mut spawner = Self {
            obstacle: SpawnTimer::new(0, 0.0, 0.0),
            coin: SpawnTimer::new(0, 0.0, 0.0),
            level: tier.level,
            field_width: FIELD_WIDTH,
            next_id: 1,
        };
        spawner.configure(tier);
        spawner
    }

    /// Tear down both timers and rebuild them from `tier`.
    /// Entities already spawned keep their speed.
    pub fn configure(&mut self, tier: &LevelTier) {
        self.obstacle = SpawnTimer::new(
            tier.obstacle_spawn_interval_ms,
            tier.obstacle_spawn_probability,
            tier.obstacle_speed,
        );
        self.coin = SpawnTimer::new(
            tier.coin_spawn_interval_ms,
            tier.coin_spawn_probability,
            tier.coin_speed,
        );
        self.level = tier.level;
        log::debug!(
            "Spawner rebuilt for level {} ({}): obstacles every {} ms, coins every {} ms",
            tier.level,
            tier.difficulty.as_str(),
            tier.obstacle_spawn_interval_ms,
            tier.coin_spawn_interval_ms
        );
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn timer(&self, kind: EntityKind) -> &SpawnTimer {
        match kind {
            EntityKind::Obstacle => &self.obstacle,
            EntityKind::Coin => &self.coin,
        }
    }

    /// Advance both timers by `dt` seconds and return whatever spawned
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, paused: bool, rng: &mut R) -> Vec<Entity> {
        let dt_ms = dt * 1000.0;
        let obstacle_fired = self.obstacle.advance(dt_ms);
        let coin_fired = self.coin.advance(dt_ms);

        let mut spawned = Vec::new();
        if obstacle_fired {
            spawned.extend(self.on_fire(EntityKind::Obstacle, paused, rng));
        }
        if coin_fired {
            spawned.extend(self.on_fire(EntityKind::Coin, paused, rng));
        }
        spawned
    }

    /// One spawn attempt for `kind`
    pub fn on_fire<R: Rng + ?Sized>(
        &mut self,
        kind: EntityKind,
        paused: bool,
        rng: &mut R,
    ) -> Option<Entity> {
        if paused {
            return None;
        }

        let timer = self.timer(kind);
        let (probability, speed) = (timer.probability, timer.speed);

        let roll: f32 = rng.random();
        if roll > probability {
            return None;
        }

        let size = kind.size();
        let max_x = (self.field_width - size.x).max(0.0);
        let x = rng.random_range(0.0..=max_x);

        let id = self.next_id;
        self.next_id += 1;

        let entity = Entity {
            id,
            kind,
            pos: Vec2::new(x, -size.y),
            fall_speed: speed,
        };
        log::debug!("Spawned {:?} #{} at x={:.0}", kind, id, x);
        Some(entity)
    }
}
