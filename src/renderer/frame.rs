//! Frame composition
//!
//! Turns a `GameState` into an ordered list of draw commands in playfield
//! coordinates. Backends (Canvas 2D, tests) only execute the list.

use glam::Vec2;

use super::shapes::{Paint, Primitive, colors, shape_at};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GameState, GameStatus, ObstacleKind};

pub const BACKGROUND: &str = "#fdf6ec";
pub const HUD_TEXT: &str = "#3a2a1f";
pub const PLAYER_FALLBACK: &str = "#c08a5b";

/// Ball spin speed (radians per second)
const BALL_SPIN: f32 = 3.0;

/// One backend-agnostic drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole playfield
    Clear { color: &'static str },
    /// The pet image, as a square centered on `center`
    Sprite { center: Vec2, size: f32 },
    /// A vector primitive
    Shape(Primitive),
    /// Left-aligned text; `pos` is the top-left corner
    Text {
        pos: Vec2,
        text: String,
        px: f32,
        color: &'static str,
    },
}

/// Everything drawn for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn push_shapes(&mut self, shapes: impl IntoIterator<Item = Primitive>) {
        self.commands.extend(shapes.into_iter().map(DrawCommand::Shape));
    }
}

/// Decorative rotation for an obstacle at `elapsed` seconds
fn spin(kind: ObstacleKind, id: u32, elapsed: f32, settings: &Settings) -> f32 {
    if kind != ObstacleKind::Ball || settings.reduced_motion {
        return 0.0;
    }
    // Offset by id so balls don't spin in lockstep
    elapsed * BALL_SPIN + id as f32 * 0.7
}

fn hitbox(center: Vec2, radius: f32) -> Primitive {
    Primitive::Circle {
        center,
        radius,
        paint: Paint::Stroke { color: colors::HITBOX, width: 1.5 },
    }
}

/// Compose the frame for the current state
pub fn compose(state: &GameState, settings: &Settings) -> Frame {
    let mut frame = Frame::default();
    frame.push(DrawCommand::Clear { color: BACKGROUND });

    if state.status == GameStatus::Loading || state.status == GameStatus::Failed {
        return frame;
    }

    frame.push(DrawCommand::Sprite {
        center: state.player.pos,
        size: PLAYER_SPRITE_SIZE,
    });

    for obstacle in &state.obstacles {
        let angle = spin(obstacle.kind, obstacle.id, state.elapsed, settings);
        frame.push_shapes(shape_at(obstacle.kind, obstacle.pos, obstacle.size, angle));
    }

    if settings.show_hitboxes {
        frame.push(DrawCommand::Shape(hitbox(state.player.pos, state.player.radius)));
        for obstacle in &state.obstacles {
            frame.push(DrawCommand::Shape(hitbox(obstacle.pos, obstacle.radius)));
        }
    }

    frame.push(DrawCommand::Text {
        pos: Vec2::new(16.0, 12.0),
        text: format!("SCORE {}", state.score),
        px: 24.0,
        color: HUD_TEXT,
    });

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shapes::base_primitives;
    use crate::settings::Tuning;

    fn running() -> GameState {
        let mut state = GameState::new(9, Tuning::default());
        state.start();
        state
    }

    #[test]
    fn test_loading_only_clears() {
        let state = GameState::new(9, Tuning::default());
        let frame = compose(&state, &Settings::default());
        assert_eq!(frame.commands, vec![DrawCommand::Clear { color: BACKGROUND }]);
    }

    #[test]
    fn test_frame_order_and_counts() {
        let mut state = running();
        state.spawn_obstacle_at(ObstacleKind::Paw, Vec2::new(100.0, 100.0), 0.0);
        state.spawn_obstacle_at(ObstacleKind::Fish, Vec2::new(300.0, 200.0), 0.0);
        let frame = compose(&state, &Settings::default());

        assert!(matches!(frame.commands[0], DrawCommand::Clear { .. }));
        assert!(matches!(frame.commands[1], DrawCommand::Sprite { center, .. } if center == state.player.pos));
        let shapes = frame
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Shape(_)))
            .count();
        assert_eq!(
            shapes,
            base_primitives(ObstacleKind::Paw).len() + base_primitives(ObstacleKind::Fish).len()
        );
        assert!(matches!(frame.commands.last(), Some(DrawCommand::Text { .. })));
    }

    #[test]
    fn test_hitboxes_are_optional() {
        let mut state = running();
        state.spawn_obstacle_at(ObstacleKind::Bone, Vec2::new(100.0, 100.0), 0.0);
        let plain = compose(&state, &Settings::default());
        let debug = compose(
            &state,
            &Settings {
                show_hitboxes: true,
                ..Default::default()
            },
        );
        assert_eq!(debug.len(), plain.len() + 2);
    }

    #[test]
    fn test_reduced_motion_stops_spin() {
        let mut state = running();
        state.elapsed = 2.0;
        state.spawn_obstacle_at(ObstacleKind::Ball, Vec2::new(100.0, 100.0), 0.0);
        let still = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let frame = compose(&state, &still);
        let arc = frame.commands.iter().find_map(|c| match c {
            DrawCommand::Shape(Primitive::Arc { start, .. }) => Some(*start),
            _ => None,
        });
        assert_eq!(arc, Some(-2.4));
    }
}
