//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Frame-rate independent (every rate is scaled by dt)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{
    base_envelope_radius, base_visual_extent, circles_overlap, envelope_radius, first_hit, visual_extent,
};
pub use spawn::{fall_speed_at, spawn_interval_at};
pub use state::{GameEvent, GameState, GameStatus, Obstacle, ObstacleKind, Player};
pub use tick::{Direction, TickInput, tick};
