//! Canvas 2D backend

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::frame::{DrawCommand, Frame, PLAYER_FALLBACK};
use super::shapes::{Paint, Primitive};
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::error::AssetError;
use crate::host::Surface;
use crate::platform::Viewport;

/// A canvas element plus its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    sprite: Option<HtmlImageElement>,
    viewport: Viewport,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, AssetError> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| AssetError::Surface(crate::error::js_error_string(&e)))?
            .ok_or_else(|| AssetError::Surface("2d context not supported".into()))?
            .dyn_into()
            .map_err(|_| AssetError::Surface("unexpected context type".into()))?;

        let mut surface = Self {
            canvas,
            ctx,
            sprite: None,
            viewport: Viewport::default(),
        };
        surface.resize(Viewport::default());
        Ok(surface)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn apply_paint(&self, paint: Paint) {
        match paint {
            Paint::Fill(color) => {
                self.ctx.set_fill_style_str(color);
                self.ctx.fill();
            }
            Paint::Stroke { color, width } => {
                self.ctx.set_stroke_style_str(color);
                self.ctx.set_line_width(width as f64);
                self.ctx.set_line_cap("round");
                self.ctx.stroke();
            }
        }
    }

    fn draw_primitive(&self, primitive: &Primitive) {
        let ctx = &self.ctx;
        match *primitive {
            Primitive::Circle { center, radius, paint } => {
                ctx.begin_path();
                let _ = ctx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, std::f64::consts::TAU);
                self.apply_paint(paint);
            }
            Primitive::Rect { center, size, paint } => {
                ctx.begin_path();
                ctx.rect(
                    (center.x - size.x / 2.0) as f64,
                    (center.y - size.y / 2.0) as f64,
                    size.x as f64,
                    size.y as f64,
                );
                self.apply_paint(paint);
            }
            Primitive::Triangle { points, paint } => {
                ctx.begin_path();
                ctx.move_to(points[0].x as f64, points[0].y as f64);
                ctx.line_to(points[1].x as f64, points[1].y as f64);
                ctx.line_to(points[2].x as f64, points[2].y as f64);
                ctx.close_path();
                self.apply_paint(paint);
            }
            Primitive::Ellipse { center, radii, paint } => {
                ctx.begin_path();
                let _ = ctx.ellipse(
                    center.x as f64,
                    center.y as f64,
                    radii.x as f64,
                    radii.y as f64,
                    0.0,
                    0.0,
                    std::f64::consts::TAU,
                );
                self.apply_paint(paint);
            }
            Primitive::Arc { center, radius, start, end, paint } => {
                ctx.begin_path();
                let _ = ctx.arc(center.x as f64, center.y as f64, radius as f64, start as f64, end as f64);
                self.apply_paint(paint);
            }
        }
    }

    fn execute(&self, command: &DrawCommand) {
        let ctx = &self.ctx;
        match command {
            DrawCommand::Clear { color } => {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(0.0, 0.0, PLAYFIELD_WIDTH as f64, PLAYFIELD_HEIGHT as f64);
            }
            DrawCommand::Sprite { center, size } => {
                let half = (*size / 2.0) as f64;
                let (x, y) = (center.x as f64 - half, center.y as f64 - half);
                match &self.sprite {
                    Some(img) => {
                        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                            img,
                            x,
                            y,
                            *size as f64,
                            *size as f64,
                        );
                    }
                    None => {
                        // Image not decoded (or failed mid-session): plain disc
                        ctx.begin_path();
                        let _ = ctx.arc(center.x as f64, center.y as f64, half, 0.0, std::f64::consts::TAU);
                        ctx.set_fill_style_str(PLAYER_FALLBACK);
                        ctx.fill();
                    }
                }
            }
            DrawCommand::Shape(primitive) => self.draw_primitive(primitive),
            DrawCommand::Text { pos, text, px, color } => {
                ctx.set_fill_style_str(color);
                ctx.set_font(&format!("bold {}px sans-serif", px));
                ctx.set_text_baseline("top");
                let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
            }
        }
    }
}

impl Surface for CanvasSurface {
    type Sprite = HtmlImageElement;

    fn set_sprite(&mut self, sprite: HtmlImageElement) {
        self.sprite = Some(sprite);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let (w, h) = viewport.backing_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", viewport.css_width));
        let _ = style.set_property("height", &format!("{}px", viewport.css_height));
        let _ = style.set_property("margin-left", &format!("{}px", viewport.offset_x));
        let _ = style.set_property("margin-top", &format!("{}px", viewport.offset_y));
    }

    fn present(&mut self, frame: &Frame) {
        let scale = self.viewport.render_scale() as f64;
        let _ = self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
        for command in &frame.commands {
            self.execute(command);
        }
    }

    fn release(&mut self) {
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx
            .clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
        self.sprite = None;
    }
}
