//! Game state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{envelope_radius, visual_extent};
use crate::consts::*;
use crate::settings::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for the pet image (and platform) to become ready
    Loading,
    /// Active gameplay
    Running,
    /// Player was hit; terminal
    Over,
    /// Assets or platform unavailable; terminal, distinct from `Over`
    Failed,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Over | GameStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Loading => "loading",
            GameStatus::Running => "running",
            GameStatus::Over => "over",
            GameStatus::Failed => "failed",
        }
    }
}

/// Obstacle archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Paw,
    Bone,
    Heart,
    Fish,
    Ball,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Paw,
        ObstacleKind::Bone,
        ObstacleKind::Heart,
        ObstacleKind::Fish,
        ObstacleKind::Ball,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Paw => "paw",
            ObstacleKind::Bone => "bone",
            ObstacleKind::Heart => "heart",
            ObstacleKind::Fish => "fish",
            ObstacleKind::Ball => "ball",
        }
    }

    /// Parse a kind name; unknown names are rejected rather than drawn as nothing
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "paw" => Some(ObstacleKind::Paw),
            "bone" => Some(ObstacleKind::Bone),
            "heart" => Some(ObstacleKind::Heart),
            "fish" => Some(ObstacleKind::Fish),
            "ball" => Some(ObstacleKind::Ball),
            _ => None,
        }
    }
}

/// A falling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Center in playfield pixels
    pub pos: Vec2,
    /// Downward speed (px/s)
    pub speed: f32,
    /// Collision envelope radius
    pub radius: f32,
    /// Drawn size
    pub size: f32,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec2, speed: f32, size: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            speed,
            radius: envelope_radius(kind, size),
            size,
        }
    }

    /// Entirely below the playfield, no pixel of the sprite left visible
    #[inline]
    pub fn is_off_screen(&self) -> bool {
        self.pos.y - visual_extent(self.kind, self.size) > PLAYFIELD_HEIGHT
    }
}

/// The player's pet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Center; `y` never changes during a session
    pub pos: Vec2,
    /// Horizontal speed (px/s)
    pub speed: f32,
    /// Collision envelope radius
    pub radius: f32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(PLAYFIELD_WIDTH / 2.0, crate::player_line_y()),
            speed: tuning.player_speed,
            radius: tuning.player_radius,
        }
    }

    /// Horizontal range the player's center may occupy
    pub fn x_bounds(&self) -> (f32, f32) {
        let margin = self.radius.min(PLAYFIELD_WIDTH / 2.0);
        (margin, PLAYFIELD_WIDTH - margin)
    }

    /// Move horizontally by `dx`, clamped to the playfield
    pub fn shift(&mut self, dx: f32) {
        let (min_x, max_x) = self.x_bounds();
        self.pos.x = (self.pos.x + dx).clamp(min_x, max_x);
    }
}

/// Events raised by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Session ended by a collision, carrying the final score
    GameOver { score: u64 },
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Spawner RNG
    pub rng: Pcg32,
    /// Balance values for this session
    pub tuning: Tuning,
    /// Current phase
    pub status: GameStatus,
    /// Seconds spent running
    pub elapsed: f32,
    /// Seconds since the last spawn (or since start)
    pub since_last_spawn: f32,
    /// Current spawn interval (seconds)
    pub spawn_interval: f32,
    /// Score shown to the player; only ever grows
    pub score: u64,
    /// Fractional score carried between ticks
    pub score_accum: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Player sprite
    pub player: Player,
    /// Active obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Next obstacle id
    next_id: u32,
}

impl GameState {
    /// Create a new session in `Loading`
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.validated();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            status: GameStatus::Loading,
            elapsed: 0.0,
            since_last_spawn: 0.0,
            spawn_interval: tuning.spawn_interval_initial,
            score: 0,
            score_accum: 0.0,
            time_ticks: 0,
            player: Player::new(&tuning),
            obstacles: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new obstacle id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Assets are ready: `Loading -> Running`. Returns false from any other state.
    pub fn start(&mut self) -> bool {
        if self.status != GameStatus::Loading {
            return false;
        }
        self.status = GameStatus::Running;
        true
    }

    /// Startup failed: `Loading -> Failed`. Returns false from any other state.
    pub fn fail(&mut self) -> bool {
        if self.status != GameStatus::Loading {
            return false;
        }
        self.status = GameStatus::Failed;
        true
    }

    /// Place an obstacle directly (spawner and tests)
    pub fn spawn_obstacle_at(&mut self, kind: ObstacleKind, pos: Vec2, speed: f32) -> u32 {
        let id = self.next_entity_id();
        let size = self.tuning.obstacle_size;
        self.obstacles.push(Obstacle::new(id, kind, pos, speed, size));
        id
    }
}
