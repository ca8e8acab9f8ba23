//! Overlap tests between the avatar and falling entities
//!
//! Everything in the play field is an axis-aligned box. Screen
//! coordinates: origin top-left, +y down.

use glam::Vec2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from its top-left corner and size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap; boxes that only touch edges do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Same box scaled about its center (used for forgiving hitboxes)
    pub fn shrunk(&self, factor: f32) -> Self {
        let center = self.center();
        let half = self.size() * 0.5 * factor;
        Self {
            min: center - half,
            max: center + half,
        }
    }
}
