//! Shape tessellation for 2D primitives (pixel space)

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Segment count for a circle of the given pixel radius
fn segments_for(radius: f32) -> u32 {
    ((radius * 0.6) as u32).clamp(8, 48)
}

/// Axis-aligned rectangle with a left-to-right color ramp
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, left: [f32; 4], right: [f32; 4]) {
    let max = min + size;
    out.push(Vertex::new(min.x, min.y, left));
    out.push(Vertex::new(max.x, min.y, right));
    out.push(Vertex::new(min.x, max.y, left));

    out.push(Vertex::new(min.x, max.y, left));
    out.push(Vertex::new(max.x, min.y, right));
    out.push(Vertex::new(max.x, max.y, right));
}

/// Filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4]) {
    let segments = segments_for(radius);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Hollow circle
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
) {
    let segments = segments_for(outer_radius) * 2;
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());

        let inner1 = center + dir1 * inner_radius;
        let outer1 = center + dir1 * outer_radius;
        let inner2 = center + dir2 * inner_radius;
        let outer2 = center + dir2 * outer_radius;

        // Two triangles per segment
        out.push(Vertex::new(inner1.x, inner1.y, color));
        out.push(Vertex::new(outer1.x, outer1.y, color));
        out.push(Vertex::new(inner2.x, inner2.y, color));

        out.push(Vertex::new(inner2.x, inner2.y, color));
        out.push(Vertex::new(outer1.x, outer1.y, color));
        out.push(Vertex::new(outer2.x, outer2.y, color));
    }
}

/// Thick line segment as a quad
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);

    let a1 = from + perp;
    let b1 = from - perp;
    let a2 = to + perp;
    let b2 = to - perp;

    out.push(Vertex::new(a1.x, a1.y, color));
    out.push(Vertex::new(b1.x, b1.y, color));
    out.push(Vertex::new(a2.x, a2.y, color));

    out.push(Vertex::new(a2.x, a2.y, color));
    out.push(Vertex::new(b1.x, b1.y, color));
    out.push(Vertex::new(b2.x, b2.y, color));
}

/// Fading, tapering trail through `points` (newest first)
pub fn trail(out: &mut Vec<Vertex>, points: &[Vec2], head_width: f32, color: [f32; 4]) {
    if points.len() < 2 {
        return;
    }
    let len = points.len() as f32;
    for i in 0..points.len() - 1 {
        let t = i as f32 / len;
        let alpha = (1.0 - t) * color[3];
        let width = head_width * (1.0 - t * 0.7);
        line(
            out,
            points[i],
            points[i + 1],
            width,
            [color[0], color[1], color[2], alpha],
        );
    }
}
