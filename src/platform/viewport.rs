//! Aspect-preserving scaling of the logical playfield into a container

use glam::Vec2;

use crate::clamp_to_playfield;
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

/// Where and how large the playfield is drawn inside its container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// CSS pixels per logical pixel
    pub scale: f32,
    /// Displayed size in CSS pixels
    pub css_width: f32,
    pub css_height: f32,
    /// Letterbox offsets inside the container (CSS pixels)
    pub offset_x: f32,
    pub offset_y: f32,
    /// Device pixel ratio used for the backing store
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::fit(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 1.0)
    }
}

impl Viewport {
    /// Fit the playfield into `container_w x container_h`, letterboxing as needed
    pub fn fit(container_w: f32, container_h: f32, device_pixel_ratio: f32) -> Self {
        let container_w = if container_w.is_finite() { container_w.max(1.0) } else { PLAYFIELD_WIDTH };
        let container_h = if container_h.is_finite() { container_h.max(1.0) } else { PLAYFIELD_HEIGHT };
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };

        let scale = (container_w / PLAYFIELD_WIDTH).min(container_h / PLAYFIELD_HEIGHT);
        let css_width = PLAYFIELD_WIDTH * scale;
        let css_height = PLAYFIELD_HEIGHT * scale;

        Self {
            scale,
            css_width,
            css_height,
            offset_x: (container_w - css_width) / 2.0,
            offset_y: (container_h - css_height) / 2.0,
            device_pixel_ratio: dpr,
        }
    }

    /// Fit into a container measured without the canvas in it
    ///
    /// A container with no height of its own (auto height) takes its height
    /// from the playfield aspect ratio, so the canvas fills the width.
    pub fn fit_container(container_w: f32, container_h: f32, device_pixel_ratio: f32) -> Self {
        let container_h = if container_h.is_finite() && container_h > 0.0 {
            container_h
        } else {
            container_w * PLAYFIELD_HEIGHT / PLAYFIELD_WIDTH
        };
        Self::fit(container_w, container_h, device_pixel_ratio)
    }

    /// Canvas backing store size in device pixels
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.css_width * self.device_pixel_ratio).round().max(1.0) as u32,
            (self.css_height * self.device_pixel_ratio).round().max(1.0) as u32,
        )
    }

    /// Transform scale from logical units to backing store pixels
    pub fn render_scale(&self) -> f32 {
        self.scale * self.device_pixel_ratio
    }

    /// Map a point relative to the displayed canvas (CSS px) to playfield coordinates
    pub fn to_logical(&self, canvas_x: f32, canvas_y: f32) -> Vec2 {
        clamp_to_playfield(Vec2::new(canvas_x, canvas_y) / self.scale)
    }
}
