//! Per-frame simulation tick
//!
//! Moves the avatar and falling entities, resolves overlaps, and keeps the
//! level in step with the score. Movement is `speed * dt`, so a late frame
//! only means a larger step.

use glam::Vec2;

use super::autopilot;
use super::levels::{level_for_score, tier_for_level};
use super::state::GameState;
use super::world::{EntityKind, World};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Confirm / restart (one-shot)
    pub confirm: bool,
    /// Idle/demo mode - autopilot steers the avatar
    pub idle_mode: bool,
}

impl TickInput {
    /// Unnormalized movement direction in screen space
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub spawned: usize,
    pub coins_collected: u32,
    /// Level reached this tick, if it changed
    pub level_up: Option<u32>,
    pub hit_obstacle: bool,
}

/// Advance the run by `dt` seconds
pub fn tick(state: &mut GameState, world: &mut World, input: &TickInput, dt: f32) -> TickReport {
    let mut report = TickReport::default();

    if state.is_ended() {
        return report;
    }

    if input.pause {
        state.toggle_pause();
    }

    // Spawn timers keep running while paused; their fires are dropped
    let spawned = world.spawner.advance(dt, state.is_paused(), &mut world.rng);
    report.spawned = spawned.len();
    world.entities.extend(spawned);

    if state.is_paused() {
        return report;
    }

    // Avatar
    let dir = if input.idle_mode {
        autopilot::steer(world)
    } else {
        input.direction()
    };
    world.avatar.move_by(dir, AVATAR_SPEED, dt);

    // Falling entities
    for entity in world.entities.iter_mut() {
        entity.fall(dt);
    }
    world.entities.retain(|e| !e.is_below_field());

    // Obstacles end the run; nothing else is processed this frame
    let hitbox = world.avatar.hitbox();
    let hits = world
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Obstacle && e.bounds().overlaps(&hitbox))
        .count();
    if hits > 0 {
        for _ in 0..hits {
            state.game_over();
        }
        report.hit_obstacle = true;
        return report;
    }

    // Coins
    let reach = world.avatar.bounds();
    let before = world.entities.len();
    world
        .entities
        .retain(|e| !(e.kind == EntityKind::Coin && e.bounds().overlaps(&reach)));
    let collected = (before - world.entities.len()) as u32;

    for _ in 0..collected {
        state.add_score(COIN_VALUE);
    }
    report.coins_collected = collected;

    // Score may also have moved outside the tick
    report.level_up = sync_level(state, world);

    report
}

/// Move the level up to the tier matching the current score and rebuild
/// the spawner. Never lowers the level.
pub fn sync_level(state: &mut GameState, world: &mut World) -> Option<u32> {
    let expected = level_for_score(state.score());
    if expected <= state.level() {
        if world.spawner.level() != state.level() {
            world.spawner.configure(tier_for_level(state.level()));
        }
        return None;
    }

    log::info!(
        "Level {} -> {} at score {}",
        state.level(),
        expected,
        state.score()
    );
    state.set_level(expected);
    world.spawner.configure(tier_for_level(expected));
    Some(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::{EventKind, GameEvent};
    use crate::sim::state::GamePhase;
    use crate::sim::world::Entity;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn place(world: &mut World, kind: EntityKind, pos: Vec2, fall_speed: f32) {
        let id = world.entities.len() as u32 + 1000;
        world.entities.push(Entity {
            id,
            kind,
            pos,
            fall_speed,
        });
    }

    /// Position an entity so it sits on the avatar's center
    fn on_avatar(world: &World, kind: EntityKind) -> Vec2 {
        world.avatar.center() - kind.size() * 0.5
    }

    #[test]
    fn test_entities_fall_by_speed_times_dt() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        place(&mut world, EntityKind::Coin, Vec2::new(10.0, 0.0), 120.0);

        tick(&mut state, &mut world, &TickInput::default(), 0.5);

        let coin = world.entities.iter().find(|e| e.id == 1000).unwrap();
        assert!((coin.pos.y - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_entities_removed_below_field() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        place(&mut world, EntityKind::Obstacle, Vec2::new(0.0, FIELD_HEIGHT - 1.0), 100.0);

        tick(&mut state, &mut world, &TickInput::default(), 0.1);

        assert_eq!(world.count(EntityKind::Obstacle), 0);
        assert_eq!(state.phase(), GamePhase::Running);
    }

    #[test]
    fn test_coin_collection_scores() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        let pos = on_avatar(&world, EntityKind::Coin);
        place(&mut world, EntityKind::Coin, pos, 0.0);

        let report = tick(&mut state, &mut world, &TickInput::default(), SIM_DT);

        assert_eq!(report.coins_collected, 1);
        assert_eq!(state.score(), COIN_VALUE as u64);
        assert_eq!(world.count(EntityKind::Coin), 0);
    }

    #[test]
    fn test_obstacle_collision_ends_run_once() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        let overs = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&overs);
        state.subscribe(EventKind::GameOver, move |e| sink.borrow_mut().push(*e));

        // Two obstacles on the avatar in the same tick, plus a coin
        let pos = on_avatar(&world, EntityKind::Obstacle);
        place(&mut world, EntityKind::Obstacle, pos, 0.0);
        place(&mut world, EntityKind::Obstacle, pos + Vec2::new(2.0, 0.0), 0.0);
        let coin = on_avatar(&world, EntityKind::Coin);
        place(&mut world, EntityKind::Coin, coin, 0.0);

        let report = tick(&mut state, &mut world, &TickInput::default(), SIM_DT);

        assert!(report.hit_obstacle);
        assert_eq!(state.phase(), GamePhase::Ended);
        assert!(state.is_paused());
        // Coin processing stopped with the hit
        assert_eq!(state.score(), 0);
        assert_eq!(
            *overs.borrow(),
            vec![GameEvent::GameOver {
                score: 0,
                best_score: 0
            }]
        );

        // Further ticks are inert
        let report = tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
        assert_eq!(report, TickReport::default());
        assert_eq!(overs.borrow().len(), 1);
    }

    #[test]
    fn test_pause_freezes_entities_and_spawns() {
        let mut state = GameState::in_memory();
        let mut world = World::new(7, 1);
        place(&mut world, EntityKind::Coin, Vec2::new(10.0, 10.0), 100.0);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &mut world, &pause, SIM_DT);
        assert_eq!(state.phase(), GamePhase::Paused);

        // Ten seconds paused: nothing moves, nothing spawns
        for _ in 0..1200 {
            let report = tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
            assert_eq!(report.spawned, 0);
        }
        assert_eq!(world.entities.len(), 1);
        assert_eq!(world.entities[0].pos, Vec2::new(10.0, 10.0));

        tick(&mut state, &mut world, &pause, SIM_DT);
        assert_eq!(state.phase(), GamePhase::Running);
    }

    #[test]
    fn test_pause_input_ignored_after_game_over() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        state.game_over();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &mut world, &pause, SIM_DT);
        assert_eq!(state.phase(), GamePhase::Ended);
    }

    #[test]
    fn test_level_follows_score() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        let levels = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&levels);
        state.subscribe(EventKind::LevelChanged, move |e| sink.borrow_mut().push(*e));

        state.set_score(140);
        let pos = on_avatar(&world, EntityKind::Coin);
        place(&mut world, EntityKind::Coin, pos, 0.0);

        let report = tick(&mut state, &mut world, &TickInput::default(), SIM_DT);

        assert_eq!(state.score(), 150);
        assert_eq!(report.level_up, Some(2));
        assert_eq!(state.level(), 2);
        assert_eq!(world.spawner.level(), 2);
        assert_eq!(*levels.borrow(), vec![GameEvent::LevelChanged { level: 2 }]);
    }

    #[test]
    fn test_level_follows_score_set_outside_tick() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        state.set_score(1000);

        let report = tick(&mut state, &mut world, &TickInput::default(), SIM_DT);

        assert_eq!(report.coins_collected, 0);
        assert_eq!(report.level_up, Some(5));
        assert_eq!(state.level(), 5);
        assert_eq!(world.spawner.level(), 5);

        // Settled: later ticks report nothing new
        let report = tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
        assert_eq!(report.level_up, None);
    }

    #[test]
    fn test_spawner_follows_level_set_outside_tick() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        state.set_level(4);

        tick(&mut state, &mut world, &TickInput::default(), SIM_DT);

        assert_eq!(state.level(), 4);
        assert_eq!(world.spawner.level(), 4);
    }

    #[test]
    fn test_lumpy_score_jumps_levels() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        state.set_score(1000);

        assert_eq!(sync_level(&mut state, &mut world), Some(5));
        assert_eq!(state.level(), 5);
        assert_eq!(world.spawner.level(), 5);
    }

    #[test]
    fn test_level_never_decreases() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        state.set_level(4);
        state.set_score(20);

        assert_eq!(sync_level(&mut state, &mut world), None);
        assert_eq!(state.level(), 4);
    }

    #[test]
    fn test_level_up_keeps_in_flight_speed() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        place(&mut world, EntityKind::Obstacle, Vec2::new(0.0, 0.0), 140.0);

        state.set_score(2600);
        sync_level(&mut state, &mut world);

        assert_eq!(world.entities[0].fall_speed, 140.0);
        assert_eq!(
            world.spawner.timer(EntityKind::Obstacle).speed,
            tier_for_level(8).obstacle_speed
        );
    }

    #[test]
    fn test_avatar_moves_with_input() {
        let mut state = GameState::in_memory();
        let mut world = World::new(1, 1);
        let start = world.avatar.pos;

        let left = TickInput {
            left: true,
            ..Default::default()
        };
        tick(&mut state, &mut world, &left, 0.5);

        assert!((world.avatar.pos.x - (start.x - AVATAR_SPEED * 0.5)).abs() < 1e-3);
        assert_eq!(world.avatar.pos.y, start.y);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let input = TickInput {
            left: true,
            right: true,
            up: true,
            ..Default::default()
        };
        assert_eq!(input.direction(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed produce identical runs
        let run = || {
            let mut state = GameState::in_memory();
            let mut world = World::new(2024, 1);
            let input = TickInput {
                idle_mode: true,
                ..Default::default()
            };
            for _ in 0..(120 * 30) {
                tick(&mut state, &mut world, &input, SIM_DT);
            }
            (state.score(), state.level(), state.is_ended(), world.entities)
        };
        assert_eq!(run(), run());
    }
}
