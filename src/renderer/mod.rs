//! Rendering module
//!
//! Obstacle geometry is defined once (`shapes`) and consumed by the live
//! frame composer, the Canvas 2D backend and the SVG icon writer.

pub mod frame;
pub mod shapes;
pub mod svg;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use frame::{DrawCommand, Frame, compose};
pub use shapes::{Paint, Primitive, base_primitives, shape_at};
pub use svg::{icon_primitives, svg_icon};
