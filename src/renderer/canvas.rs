//! Immediate-mode 2D drawing target used by scenes

use glam::Vec2;

use super::shapes;
use super::vertex::Vertex;
use crate::Bounds;

pub type Color = [f32; 4];

/// Pixel-space drawing commands a scene may issue
pub trait Canvas {
    fn bounds(&self) -> Bounds;
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    /// Rectangle shaded from `left` to `right`
    fn fill_rect_gradient(&mut self, min: Vec2, size: Vec2, left: Color, right: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    fn polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color);
        }
    }
    /// Fading trail through `points`, newest first
    fn trail(&mut self, points: &[Vec2], head_width: f32, color: Color) {
        self.polyline(points, head_width, color);
    }
    /// Text annotation; optional for targets that cannot draw glyphs
    fn label(&mut self, pos: Vec2, text: &str, color: Color);
}

/// A text annotation collected for an overlay
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub pos: Vec2,
    pub text: String,
    pub color: Color,
}

/// Canvas that tessellates everything into colored triangles
#[derive(Debug, Clone, Default)]
pub struct VertexCanvas {
    bounds: Bounds,
    clear_color: Color,
    vertices: Vec<Vertex>,
    labels: Vec<TextLabel>,
}

impl VertexCanvas {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            clear_color: super::vertex::colors::BACKGROUND,
            vertices: Vec::with_capacity(4096),
            labels: Vec::new(),
        }
    }

    /// Start a fresh frame
    pub fn reset(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.vertices.clear();
        self.labels.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }
}

impl Canvas for VertexCanvas {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
        self.labels.clear();
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        shapes::rect(&mut self.vertices, min, size, color, color);
    }

    fn fill_rect_gradient(&mut self, min: Vec2, size: Vec2, left: Color, right: Color) {
        shapes::rect(&mut self.vertices, min, size, left, right);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius > 0.0 {
            shapes::circle(&mut self.vertices, center, radius, color);
        }
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        let inner = (radius - width * 0.5).max(0.0);
        shapes::ring(&mut self.vertices, center, inner, radius + width * 0.5, color);
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        shapes::line(&mut self.vertices, from, to, width, color);
    }

    fn trail(&mut self, points: &[Vec2], head_width: f32, color: Color) {
        shapes::trail(&mut self.vertices, points, head_width, color);
    }

    fn label(&mut self, pos: Vec2, text: &str, color: Color) {
        self.labels.push(TextLabel {
            pos,
            text: text.to_string(),
            color,
        });
    }
}
