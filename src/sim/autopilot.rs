//! Idle/demo steering
//!
//! Dodges the most urgent obstacle heading for the avatar's column,
//! otherwise chases the coin that lands soonest, otherwise drifts back to
//! the middle. Only steers horizontally.

use glam::Vec2;

use super::world::{Entity, EntityKind, World};
use crate::consts::{AVATAR_SPEED, FIELD_WIDTH};

/// Seconds of warning the autopilot reacts to
const LOOKAHEAD_SECS: f32 = 0.9;
/// Extra horizontal clearance around the avatar
const DODGE_MARGIN: f32 = 16.0;
/// Horizontal error below which the autopilot stops steering
const DEADZONE: f32 = 4.0;

/// Seconds until `entity`'s bottom edge reaches `y`, if it is still above it
fn time_to_reach(entity: &Entity, y: f32) -> Option<f32> {
    let bottom = entity.pos.y + entity.kind.size().y;
    if bottom > y || entity.fall_speed <= 0.0 {
        return None;
    }
    Some((y - bottom) / entity.fall_speed)
}

/// Direction to steer this tick
pub fn steer(world: &World) -> Vec2 {
    let avatar = &world.avatar;
    let left = avatar.pos.x - DODGE_MARGIN;
    let right = avatar.pos.x + avatar.size.x + DODGE_MARGIN;
    let top = avatar.pos.y;

    let in_column = |e: &Entity| {
        let w = e.kind.size().x;
        e.pos.x < right && e.pos.x + w > left
    };

    // Most urgent obstacle in our column
    let threat = world
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Obstacle && in_column(e))
        .filter_map(|e| time_to_reach(e, top).map(|t| (t, e)))
        .filter(|(t, _)| *t < LOOKAHEAD_SECS)
        .min_by(|a, b| a.0.total_cmp(&b.0));

    if let Some((_, obstacle)) = threat {
        let obstacle_center = obstacle.pos.x + obstacle.kind.size().x * 0.5;
        let avatar_center = avatar.center().x;
        let room_left = avatar.pos.x;
        let room_right = FIELD_WIDTH - (avatar.pos.x + avatar.size.x);

        let go_left = if avatar_center < obstacle_center {
            room_left > avatar.size.x
        } else {
            room_right <= avatar.size.x
        };
        return Vec2::new(if go_left { -1.0 } else { 1.0 }, 0.0);
    }

    // Soonest reachable coin
    let target = world
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Coin)
        .filter_map(|e| time_to_reach(e, top).map(|t| (t, e)))
        .filter(|(t, e)| {
            let dx = (e.pos.x + e.kind.size().x * 0.5 - avatar.center().x).abs();
            dx / AVATAR_SPEED <= *t
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, e)| e.pos.x + e.kind.size().x * 0.5)
        .unwrap_or(FIELD_WIDTH / 2.0);

    let dx = target - avatar.center().x;
    if dx.abs() < DEADZONE {
        Vec2::ZERO
    } else {
        Vec2::new(dx.signum(), 0.0)
    }
}
