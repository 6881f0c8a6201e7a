//! Input controller
//!
//! Keyboard keys, pointer hot zones and on-screen buttons all collapse into
//! one sampled `Direction`. Every active hold is kept in press order; the
//! most recent hold wins, and releasing it falls back to the one before.

use crate::consts::PLAYFIELD_WIDTH;
use crate::sim::Direction;

/// Where a hold came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Keyboard key, by `KeyboardEvent.key`
    Key(String),
    /// Pointer/touch contact, by pointer id
    Pointer(i32),
    /// External on-screen control buttons
    Button,
}

/// Map a `KeyboardEvent.key` value to a direction
pub fn key_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" | "Left" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "Right" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

/// Hot zone for a pointer at logical x: left half or right half
pub fn zone_direction(logical_x: f32) -> Direction {
    if logical_x < PLAYFIELD_WIDTH / 2.0 {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// Where a keyboard event was aimed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget {
    /// Text field, textarea, select or contenteditable: the page owns the key
    Editable,
    /// The game canvas, or the page body with nothing else focused
    Game,
    /// Some other focusable page element (button, link, ...)
    Other,
}

/// What to do with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRoute {
    /// Leave the event alone
    Ignore,
    /// Feed it to the controller; `prevent_default` suppresses scrolling
    Handle { prevent_default: bool },
}

/// Route a key down event
///
/// Typing into page forms never steers the pet. Default actions are only
/// suppressed while a round is running and the game itself has focus.
pub fn route_key_down(key: &str, target: KeyTarget, running: bool) -> KeyRoute {
    if target == KeyTarget::Editable || key_direction(key).is_none() {
        return KeyRoute::Ignore;
    }
    KeyRoute::Handle {
        prevent_default: running && target == KeyTarget::Game,
    }
}

/// Hold identity for a key; letter keys ignore case so Shift can't strand a hold
fn key_source(key: &str) -> InputSource {
    if key.chars().count() == 1 {
        InputSource::Key(key.to_ascii_lowercase())
    } else {
        InputSource::Key(key.to_string())
    }
}

/// Current direction state, sampled once per tick
#[derive(Debug, Clone, Default)]
pub struct InputController {
    held: Vec<(InputSource, Direction)>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction the simulation should use this tick
    pub fn direction(&self) -> Direction {
        self.held.last().map(|(_, d)| *d).unwrap_or_default()
    }

    /// Begin a hold. A source already held keeps its place (key repeat).
    pub fn press(&mut self, source: InputSource, direction: Direction) {
        if direction == Direction::None {
            self.release(&source);
            return;
        }
        if let Some(entry) = self.held.iter_mut().find(|(s, _)| *s == source) {
            if entry.1 == direction {
                return;
            }
            // Same source, new direction: treat as a fresh press
            self.held.retain(|(s, _)| *s != source);
        }
        self.held.push((source, direction));
    }

    /// End a hold; unknown sources are ignored
    pub fn release(&mut self, source: &InputSource) {
        self.held.retain(|(s, _)| s != source);
    }

    /// Drop every hold (blur, teardown)
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Returns true if the key is a game key (caller may prevent default)
    pub fn key_down(&mut self, key: &str) -> bool {
        match key_direction(key) {
            Some(direction) => {
                self.press(key_source(key), direction);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        if key_direction(key).is_none() {
            return false;
        }
        self.release(&key_source(key));
        true
    }

    /// Pointer pressed at a logical playfield x
    pub fn pointer_down(&mut self, pointer_id: i32, logical_x: f32) {
        self.press(InputSource::Pointer(pointer_id), zone_direction(logical_x));
    }

    pub fn pointer_up(&mut self, pointer_id: i32) {
        self.release(&InputSource::Pointer(pointer_id));
    }

    pub fn press_left(&mut self) {
        self.press(InputSource::Button, Direction::Left);
    }

    pub fn press_right(&mut self) {
        self.press(InputSource::Button, Direction::Right);
    }

    /// Release the on-screen buttons
    pub fn release_buttons(&mut self) {
        self.release(&InputSource::Button);
    }
}
