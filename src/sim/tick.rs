//! Per-frame simulation tick
//!
//! Core game loop that advances a session by one variable timestep.

use serde::{Deserialize, Serialize};

use super::collision::first_hit;
use super::spawn::update_spawner;
use super::state::{GameEvent, GameState, GameStatus};
use crate::consts::MAX_FRAME_DT;

/// Discretized horizontal intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// -1, 0 or +1 along x
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
            Direction::None => 0.0,
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Sampled from the input controller this frame
    pub direction: Direction,
}

/// Advance the game state by `dt` seconds
///
/// Returns `Some(GameEvent::GameOver)` exactly once per session, on the tick
/// that detects the collision. Ticks outside `Running` do nothing.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Option<GameEvent> {
    if state.status != GameStatus::Running {
        return None;
    }
    if !dt.is_finite() || dt <= 0.0 {
        return None;
    }
    let dt = dt.min(MAX_FRAME_DT);

    state.time_ticks += 1;

    // 1. Clock
    state.elapsed += dt;
    state.since_last_spawn += dt;

    // 2. Spawner
    update_spawner(state);

    // 3. Fall, then cull anything that left through the bottom
    for obstacle in &mut state.obstacles {
        obstacle.pos.y += obstacle.speed * dt;
    }
    state.obstacles.retain(|o| !o.is_off_screen());

    // 4. Player
    let dx = input.direction.sign() * state.player.speed * dt;
    state.player.shift(dx);

    // 5. Collisions; score is still the value from the previous tick
    if let Some(hit) = first_hit(&state.player, &state.obstacles) {
        log::info!(
            "Game over: hit by {} #{} after {:.2}s, score {}",
            hit.kind.as_str(),
            hit.id,
            state.elapsed,
            state.score
        );
        state.status = GameStatus::Over;
        return Some(GameEvent::GameOver { score: state.score });
    }

    // 6. Survival score
    state.score_accum += f64::from(state.tuning.score_per_second) * f64::from(dt);
    state.score = state.score.max(state.score_accum.floor() as u64);

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Tuning;
    use crate::sim::ObstacleKind;
    use crate::sim::spawn::spawn_interval_at;
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default());
        state.start();
        state
    }

    #[test]
    fn test_loading_does_not_tick() {
        let mut state = GameState::new(1, Tuning::default());
        assert!(tick(&mut state, &TickInput::default(), DT).is_none());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.elapsed, 0.0);
    }

    #[test]
    fn test_idle_before_first_spawn() {
        // No input, no obstacles yet: player stays put, score grows
        let mut state = running(1);
        let start_x = state.player.pos.x;
        let input = TickInput::default();
        let mut last_score = 0;
        while state.elapsed + DT < state.spawn_interval {
            assert!(tick(&mut state, &input, DT).is_none());
            assert!(state.score >= last_score);
            last_score = state.score;
        }
        assert!(state.obstacles.is_empty());
        assert_eq!(state.player.pos.x, start_x);
        assert_eq!(state.status, GameStatus::Running);
        assert!(state.score > 0);
    }

    #[test]
    fn test_collision_ends_game_with_previous_score() {
        let mut state = running(5);
        let input = TickInput::default();
        for _ in 0..30 {
            tick(&mut state, &input, DT);
        }
        let score_before = state.score;
        let pos = state.player.pos;
        state.spawn_obstacle_at(ObstacleKind::Heart, pos, 0.0);

        let event = tick(&mut state, &input, DT);
        assert_eq!(event, Some(GameEvent::GameOver { score: score_before }));
        assert_eq!(state.status, GameStatus::Over);
        assert_eq!(state.score, score_before);

        // Terminal: no more processing, no second event
        let ticks = state.time_ticks;
        for _ in 0..10 {
            assert!(tick(&mut state, &input, DT).is_none());
        }
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_two_spawns_exactly() {
        let mut state = running(11);
        let input = TickInput::default();
        let first_interval = state.spawn_interval;

        // Run until the first spawn
        while state.obstacles.is_empty() {
            tick(&mut state, &input, DT);
        }
        let t1 = state.elapsed;
        assert!(t1 >= first_interval);
        assert_eq!(state.spawn_interval, spawn_interval_at(&state.tuning, t1));

        // Run until the second spawn
        let mut ticks = 0;
        while state.obstacles.len() < 2 {
            tick(&mut state, &input, DT);
            ticks += 1;
            assert!(ticks < 1000);
        }
        let t2 = state.elapsed;
        assert!(t2 - t1 >= spawn_interval_at(&state.tuning, t1) - 1e-4);
        assert_eq!(state.obstacles.len(), 2);
    }

    #[test]
    fn test_offscreen_obstacles_are_culled_unscored() {
        let mut state = running(2);
        state.player.pos.x = PLAYER_SPRITE_SIZE;
        state.spawn_obstacle_at(
            ObstacleKind::Bone,
            Vec2::new(PLAYFIELD_WIDTH - 40.0, PLAYFIELD_HEIGHT + 30.0),
            200.0,
        );
        let score = state.score;
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.obstacles.is_empty());
        assert!(state.score - score <= 1);
    }

    #[test]
    fn test_score_ignores_obstacle_count() {
        let mut sparse = running(8);
        let mut crowded = running(8);
        // Parked near the top, far above the player's line
        for i in 0..60 {
            let x = 30.0 + (i % 12) as f32 * (PLAYFIELD_WIDTH - 60.0) / 11.0;
            let y = 40.0 + (i / 12) as f32 * 30.0;
            crowded.spawn_obstacle_at(ObstacleKind::ALL[i % 5], Vec2::new(x, y), 0.0);
        }

        let input = TickInput::default();
        for _ in 0..600 {
            // Only the parked crowd differs; spawned fallers are dropped from both
            sparse.obstacles.clear();
            crowded.obstacles.retain(|o| o.speed == 0.0);
            assert!(tick(&mut sparse, &input, DT).is_none());
            assert!(tick(&mut crowded, &input, DT).is_none());
        }

        assert_eq!(crowded.obstacles.iter().filter(|o| o.speed == 0.0).count(), 60);
        assert!(sparse.score > 0);
        assert_eq!(sparse.score, crowded.score);
    }

    #[test]
    fn test_player_moves_with_direction() {
        let mut state = running(3);
        let x0 = state.player.pos.x;
        tick(&mut state, &TickInput { direction: Direction::Left }, DT);
        assert!(state.player.pos.x < x0);
        let x1 = state.player.pos.x;
        tick(&mut state, &TickInput { direction: Direction::Right }, DT);
        assert!(state.player.pos.x > x1);
    }

    #[test]
    fn test_frame_dt_is_clamped() {
        let mut state = running(4);
        tick(&mut state, &TickInput::default(), 5.0);
        assert!((state.elapsed - MAX_FRAME_DT).abs() < 1e-6);

        let elapsed = state.elapsed;
        tick(&mut state, &TickInput::default(), f32::NAN);
        tick(&mut state, &TickInput::default(), -1.0);
        assert_eq!(state.elapsed, elapsed);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = running(99999);
        let mut state2 = running(99999);

        let inputs = [Direction::Left, Direction::None, Direction::Right, Direction::Right];
        for i in 0..600 {
            let input = TickInput { direction: inputs[i % inputs.len()] };
            let e1 = tick(&mut state1, &input, DT);
            let e2 = tick(&mut state2, &input, DT);
            assert_eq!(e1, e2);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.obstacles.len(), state2.obstacles.len());
        assert!((state1.player.pos.x - state2.player.pos.x).abs() < 0.0001);
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Left), Just(Direction::Right), Just(Direction::None)]
    }

    proptest! {
        #[test]
        fn prop_invariants_hold(
            seed in any::<u64>(),
            steps in prop::collection::vec((direction_strategy(), 0.001f32..0.2), 1..400),
        ) {
            let mut state = running(seed);
            let mut events = 0;
            let mut last_score = 0;

            for (direction, dt) in steps {
                let was_running = state.status == GameStatus::Running;
                let ticks = state.time_ticks;
                if tick(&mut state, &TickInput { direction }, dt).is_some() {
                    events += 1;
                }

                // Score monotonicity
                prop_assert!(state.score >= last_score);
                last_score = state.score;

                // Bounds clamp
                prop_assert!(state.player.pos.x >= 0.0 && state.player.pos.x <= PLAYFIELD_WIDTH);

                // Spawn floor
                prop_assert!(state.spawn_interval >= state.tuning.spawn_interval_min);

                // Nothing runs after game over
                if !was_running {
                    prop_assert_eq!(state.time_ticks, ticks);
                }
            }

            prop_assert!(events <= 1);
            prop_assert_eq!(events == 1, state.status == GameStatus::Over);
        }

        #[test]
        fn prop_spawn_interval_floor(elapsed in 0.0f32..1.0e6) {
            let tuning = Tuning::default();
            prop_assert!(spawn_interval_at(&tuning, elapsed) >= tuning.spawn_interval_min);
        }
    }
}
