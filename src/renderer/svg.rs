//! Static SVG icons built from the in-game obstacle geometry

use std::fmt::Write;

use glam::Vec2;

use super::shapes::{Paint, Primitive, shape_at};
use crate::sim::ObstacleKind;

/// Icon primitives: the obstacle drawn at `size`, centered in a `size x size` box
pub fn icon_primitives(kind: ObstacleKind, size: f32) -> Vec<Primitive> {
    shape_at(kind, Vec2::splat(size / 2.0), size, 0.0)
}

fn paint_attrs(paint: Paint) -> String {
    match paint {
        Paint::Fill(color) => format!(r#"fill="{color}""#),
        Paint::Stroke { color, width } => {
            format!(r#"fill="none" stroke="{color}" stroke-width="{}" stroke-linecap="round""#, num(width))
        }
    }
}

/// Compact number formatting (at most two decimals, no trailing zeros)
fn num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// SVG element for one primitive
pub fn primitive_markup(primitive: &Primitive) -> String {
    match *primitive {
        Primitive::Circle { center, radius, paint } => format!(
            r#"<circle cx="{}" cy="{}" r="{}" {}/>"#,
            num(center.x),
            num(center.y),
            num(radius),
            paint_attrs(paint)
        ),
        Primitive::Rect { center, size, paint } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
            num(center.x - size.x / 2.0),
            num(center.y - size.y / 2.0),
            num(size.x),
            num(size.y),
            paint_attrs(paint)
        ),
        Primitive::Triangle { points, paint } => {
            let pts = points
                .iter()
                .map(|p| format!("{},{}", num(p.x), num(p.y)))
                .collect::<Vec<_>>()
                .join(" ");
            format!(r#"<polygon points="{pts}" {}/>"#, paint_attrs(paint))
        }
        Primitive::Ellipse { center, radii, paint } => format!(
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" {}/>"#,
            num(center.x),
            num(center.y),
            num(radii.x),
            num(radii.y),
            paint_attrs(paint)
        ),
        Primitive::Arc { center, radius, start, end, paint } => {
            let from = center + Vec2::from_angle(start) * radius;
            let to = center + Vec2::from_angle(end) * radius;
            let sweep = (end - start).rem_euclid(std::f32::consts::TAU);
            let large_arc = if sweep > std::f32::consts::PI { 1 } else { 0 };
            format!(
                r#"<path d="M {} {} A {} {} 0 {} 1 {} {}" {}/>"#,
                num(from.x),
                num(from.y),
                num(radius),
                num(radius),
                large_arc,
                num(to.x),
                num(to.y),
                paint_attrs(paint)
            )
        }
    }
}

/// Complete `<svg>` icon for an obstacle kind
pub fn svg_icon(kind: ObstacleKind, size: f32) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}" role="img" aria-label="{label}">"#,
        s = num(size),
        label = kind.as_str()
    );
    for primitive in icon_primitives(kind, size) {
        out.push_str(&primitive_markup(&primitive));
    }
    out.push_str("</svg>");
    out
}
