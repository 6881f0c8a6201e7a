//! Collision envelopes and overlap tests
//!
//! Every obstacle is approximated by one circle centered on its drawing
//! origin. Radii stay inside the drawn silhouette, so a visual near miss
//! is never a hit.

use glam::Vec2;

use super::state::{Obstacle, ObstacleKind, Player};
use crate::consts::OBSTACLE_BASE_SIZE;

/// Envelope radius of each kind at `OBSTACLE_BASE_SIZE`
///
/// | kind  | drawn half-extent | envelope |
/// |-------|-------------------|----------|
/// | paw   | ~20               | 16       |
/// | bone  | 25 x 10           | 13       |
/// | heart | ~18               | 14       |
/// | fish  | ~27 x 10          | 13       |
/// | ball  | 20                | 17       |
pub const fn base_envelope_radius(kind: ObstacleKind) -> f32 {
    match kind {
        ObstacleKind::Paw => 16.0,
        ObstacleKind::Bone => 13.0,
        ObstacleKind::Heart => 14.0,
        ObstacleKind::Fish => 13.0,
        ObstacleKind::Ball => 17.0,
    }
}

/// Farthest point of each kind's silhouette from its origin at
/// `OBSTACLE_BASE_SIZE`, rounded up
pub const fn base_visual_extent(kind: ObstacleKind) -> f32 {
    match kind {
        ObstacleKind::Paw => 24.0,
        ObstacleKind::Bone => 25.0,
        ObstacleKind::Heart => 20.0,
        ObstacleKind::Fish => 26.0,
        ObstacleKind::Ball => 20.0,
    }
}

/// Drawn reach of an obstacle at `size`; nothing is visible beyond it
#[inline]
pub fn visual_extent(kind: ObstacleKind, size: f32) -> f32 {
    base_visual_extent(kind) * size / OBSTACLE_BASE_SIZE
}

/// Envelope radius for an obstacle drawn at `size`
#[inline]
pub fn envelope_radius(kind: ObstacleKind, size: f32) -> f32 {
    base_envelope_radius(kind) * size / OBSTACLE_BASE_SIZE
}

/// Signed gap between two circles (negative = overlapping)
#[inline]
pub fn circle_gap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> f32 {
    (a - b).length() - (radius_a + radius_b)
}

/// Strict overlap; circles that merely touch do not collide
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    circle_gap(a, radius_a, b, radius_b) < 0.0
}

/// First obstacle (in spawn order) overlapping the player
pub fn first_hit<'a>(player: &Player, obstacles: &'a [Obstacle]) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .find(|o| circles_overlap(player.pos, player.radius, o.pos, o.radius))
}
