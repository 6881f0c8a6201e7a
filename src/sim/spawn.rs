//! Obstacle spawner
//!
//! Difficulty ramps with survival time: the interval between spawns shrinks
//! linearly down to a floor and fall speed grows linearly up to a cap.

use glam::Vec2;
use rand::Rng;

use super::collision::visual_extent;
use super::state::{GameState, ObstacleKind};
use crate::consts::PLAYFIELD_WIDTH;
use crate::settings::Tuning;

/// Spawn interval after `elapsed` seconds; never below `spawn_interval_min`
pub fn spawn_interval_at(tuning: &Tuning, elapsed: f32) -> f32 {
    let decayed = tuning.spawn_interval_initial - tuning.spawn_interval_decay * elapsed.max(0.0);
    decayed.max(tuning.spawn_interval_min)
}

/// Fall speed for an obstacle spawned after `elapsed` seconds
pub fn fall_speed_at(tuning: &Tuning, elapsed: f32) -> f32 {
    (tuning.obstacle_base_speed + tuning.obstacle_speed_ramp * elapsed.max(0.0))
        .min(tuning.obstacle_max_speed)
}

/// Spawn one obstacle at a random column above the top edge
///
/// The obstacle starts fully above the playfield, so it can never overlap
/// the player (whose line sits near the bottom) on its first tick.
pub fn spawn_obstacle(state: &mut GameState) -> u32 {
    let kind = ObstacleKind::ALL[state.rng.random_range(0..ObstacleKind::ALL.len())];
    let size = state.tuning.obstacle_size;
    let reach = visual_extent(kind, size);

    // Keep the whole sprite inside the horizontal bounds
    let min_x = reach.min(PLAYFIELD_WIDTH / 2.0);
    let max_x = PLAYFIELD_WIDTH - min_x;
    let x = if max_x > min_x {
        state.rng.random_range(min_x..=max_x)
    } else {
        PLAYFIELD_WIDTH / 2.0
    };
    let y = -reach;

    let speed = fall_speed_at(&state.tuning, state.elapsed);
    let id = state.spawn_obstacle_at(kind, Vec2::new(x, y), speed);
    log::trace!(
        "spawn #{} {} at x={:.0} speed={:.0} (t={:.2}s)",
        id,
        kind.as_str(),
        x,
        speed,
        state.elapsed
    );
    id
}

/// Run the spawner for this tick (timer already advanced by the caller)
///
/// At most one obstacle per tick; a long frame does not release a burst.
pub fn update_spawner(state: &mut GameState) -> Option<u32> {
    if state.since_last_spawn < state.spawn_interval {
        return None;
    }
    let id = spawn_obstacle(state);
    state.since_last_spawn = 0.0;
    state.spawn_interval = spawn_interval_at(&state.tuning, state.elapsed);
    Some(id)
}
