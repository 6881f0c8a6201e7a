//! Obstacle shape geometry
//!
//! Each obstacle kind is a fixed list of primitives authored around the
//! origin at `OBSTACLE_BASE_SIZE`. The live game and the static SVG icons
//! both place these same literals, so an icon always matches the sprite.

use glam::Vec2;

use crate::consts::OBSTACLE_BASE_SIZE;
use crate::sim::ObstacleKind;

/// How a primitive is painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Fill(&'static str),
    Stroke { color: &'static str, width: f32 },
}

/// A 2D drawing primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Circle {
        center: Vec2,
        radius: f32,
        paint: Paint,
    },
    /// Axis-aligned rectangle given by its center
    Rect {
        center: Vec2,
        size: Vec2,
        paint: Paint,
    },
    Triangle {
        points: [Vec2; 3],
        paint: Paint,
    },
    /// Axis-aligned ellipse
    Ellipse {
        center: Vec2,
        radii: Vec2,
        paint: Paint,
    },
    /// Circular arc, clockwise from `start` to `end` (radians, y down)
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        paint: Paint,
    },
}

pub mod colors {
    pub const PAW: &str = "#8d5a3b";
    pub const PAW_TOE: &str = "#a86f4c";
    pub const BONE: &str = "#f3ead8";
    pub const HEART: &str = "#e5484d";
    pub const FISH: &str = "#3d8bd4";
    pub const FISH_EYE: &str = "#10202f";
    pub const BALL: &str = "#f2c230";
    pub const BALL_STRIPE: &str = "#ffffff";
    pub const HITBOX: &str = "rgba(255, 0, 80, 0.8)";
}

static PAW: [Primitive; 4] = [
    Primitive::Circle { center: Vec2::new(0.0, 5.0), radius: 15.0, paint: Paint::Fill(colors::PAW) },
    Primitive::Circle { center: Vec2::new(-12.0, -10.0), radius: 8.0, paint: Paint::Fill(colors::PAW_TOE) },
    Primitive::Circle { center: Vec2::new(0.0, -15.0), radius: 8.0, paint: Paint::Fill(colors::PAW_TOE) },
    Primitive::Circle { center: Vec2::new(12.0, -10.0), radius: 8.0, paint: Paint::Fill(colors::PAW_TOE) },
];

static BONE: [Primitive; 3] = [
    Primitive::Rect { center: Vec2::ZERO, size: Vec2::new(30.0, 10.0), paint: Paint::Fill(colors::BONE) },
    Primitive::Circle { center: Vec2::new(-15.0, 0.0), radius: 10.0, paint: Paint::Fill(colors::BONE) },
    Primitive::Circle { center: Vec2::new(15.0, 0.0), radius: 10.0, paint: Paint::Fill(colors::BONE) },
];

static HEART: [Primitive; 3] = [
    Primitive::Triangle {
        points: [Vec2::new(-17.0, -1.0), Vec2::new(17.0, -1.0), Vec2::new(0.0, 18.0)],
        paint: Paint::Fill(colors::HEART),
    },
    Primitive::Circle { center: Vec2::new(-8.0, -5.0), radius: 10.0, paint: Paint::Fill(colors::HEART) },
    Primitive::Circle { center: Vec2::new(8.0, -5.0), radius: 10.0, paint: Paint::Fill(colors::HEART) },
];

static FISH: [Primitive; 3] = [
    Primitive::Ellipse { center: Vec2::new(-4.0, 0.0), radii: Vec2::new(17.5, 10.0), paint: Paint::Fill(colors::FISH) },
    Primitive::Triangle {
        points: [Vec2::new(11.0, 0.0), Vec2::new(23.0, -10.0), Vec2::new(23.0, 10.0)],
        paint: Paint::Fill(colors::FISH),
    },
    Primitive::Circle { center: Vec2::new(-12.0, -3.0), radius: 2.5, paint: Paint::Fill(colors::FISH_EYE) },
];

static BALL: [Primitive; 2] = [
    Primitive::Circle { center: Vec2::ZERO, radius: 20.0, paint: Paint::Fill(colors::BALL) },
    Primitive::Arc {
        center: Vec2::ZERO,
        radius: 13.0,
        start: -2.4,
        end: -0.8,
        paint: Paint::Stroke { color: colors::BALL_STRIPE, width: 3.0 },
    },
];

/// Primitives of a kind at `OBSTACLE_BASE_SIZE`, centered on the origin
pub fn base_primitives(kind: ObstacleKind) -> &'static [Primitive] {
    match kind {
        ObstacleKind::Paw => &PAW,
        ObstacleKind::Bone => &BONE,
        ObstacleKind::Heart => &HEART,
        ObstacleKind::Fish => &FISH,
        ObstacleKind::Ball => &BALL,
    }
}

#[inline]
fn rotate(p: Vec2, angle: f32) -> Vec2 {
    if angle == 0.0 {
        p
    } else {
        Vec2::from_angle(angle).rotate(p)
    }
}

impl Primitive {
    /// Scale about the origin, rotate by `angle`, then move to `origin`
    ///
    /// Rotation is exact for circles, triangles and arcs. Rectangles and
    /// ellipses stay axis-aligned (only their centers rotate).
    pub fn placed(&self, origin: Vec2, scale: f32, angle: f32) -> Primitive {
        let map = |p: Vec2| origin + rotate(p * scale, angle);
        let paint = |paint: Paint| match paint {
            Paint::Fill(color) => Paint::Fill(color),
            Paint::Stroke { color, width } => Paint::Stroke { color, width: width * scale },
        };
        match *self {
            Primitive::Circle { center, radius, paint: p } => Primitive::Circle {
                center: map(center),
                radius: radius * scale,
                paint: paint(p),
            },
            Primitive::Rect { center, size, paint: p } => Primitive::Rect {
                center: map(center),
                size: size * scale,
                paint: paint(p),
            },
            Primitive::Triangle { points, paint: p } => Primitive::Triangle {
                points: points.map(map),
                paint: paint(p),
            },
            Primitive::Ellipse { center, radii, paint: p } => Primitive::Ellipse {
                center: map(center),
                radii: radii * scale,
                paint: paint(p),
            },
            Primitive::Arc { center, radius, start, end, paint: p } => Primitive::Arc {
                center: map(center),
                radius: radius * scale,
                start: start + angle,
                end: end + angle,
                paint: paint(p),
            },
        }
    }
}

/// Primitives for a kind drawn at `size`, centered on `origin`
pub fn shape_at(kind: ObstacleKind, origin: Vec2, size: f32, angle: f32) -> Vec<Primitive> {
    let scale = size / OBSTACLE_BASE_SIZE;
    base_primitives(kind)
        .iter()
        .map(|p| p.placed(origin, scale, angle))
        .collect()
}
