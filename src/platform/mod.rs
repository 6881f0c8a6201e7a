//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, pointer hot zones, on-screen buttons)
//! - Viewport scaling
//! - Capability detection

pub mod capability;
pub mod input;
pub mod viewport;

pub use capability::PlatformCapability;
pub use input::{InputController, InputSource, KeyRoute, KeyTarget, key_direction, route_key_down, zone_direction};
pub use viewport::Viewport;

pub use crate::sim::Direction;
