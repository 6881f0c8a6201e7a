//! Pet Dodge - a "dodge the falling obstacles" pet arcade mini-game
//!
//! Core modules:
//! - `sim`: Simulation (spawner, movement, collisions, score, game over)
//! - `renderer`: Obstacle shapes, frame composition, Canvas 2D / SVG output
//! - `platform`: Input, viewport scaling and capability detection
//! - `host`: Session lifecycle, mounting and teardown
//! - `api`: Score submission and weekly ranking client
//! - `settings`: Data-driven game balance and preferences

pub mod api;
pub mod error;
pub mod highscores;
pub mod host;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ApiError, AssetError, HostError};
pub use highscores::HighScores;
pub use host::{GameHost, Surface};
pub use platform::{Direction, InputController, PlatformCapability, Viewport};
pub use settings::{Settings, Tuning};
pub use sim::{GameEvent, GameState, GameStatus, ObstacleKind};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical playfield size; the display scales this to fit its container
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Largest frame delta fed into a tick (a stalled tab must not teleport obstacles)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Delta used for the very first frame of a session
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Player sprite is drawn as a square of this side
    pub const PLAYER_SPRITE_SIZE: f32 = 64.0;
    /// Distance from the bottom edge to the player's center line
    pub const PLAYER_BOTTOM_MARGIN: f32 = 56.0;

    /// Reference size the obstacle shape literals are authored at
    pub const OBSTACLE_BASE_SIZE: f32 = 40.0;
}

/// Fixed vertical position of the player's center
#[inline]
pub fn player_line_y() -> f32 {
    consts::PLAYFIELD_HEIGHT - consts::PLAYER_BOTTOM_MARGIN
}

/// Clamp a point into the playfield rectangle
#[inline]
pub fn clamp_to_playfield(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(0.0, consts::PLAYFIELD_WIDTH),
        pos.y.clamp(0.0, consts::PLAYFIELD_HEIGHT),
    )
}
