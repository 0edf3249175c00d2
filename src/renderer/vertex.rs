//! Vertex layout and arena palette

use bytemuck::{Pod, Zeroable};

/// Pixel-space vertex, one per triangle corner
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Arena palette
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.02, 1.0];
    /// Acid green
    pub const ACCENT: [f32; 4] = [0.8, 1.0, 0.0, 1.0];
    pub const ACCENT_DEEP: [f32; 4] = [0.4, 1.0, 0.0, 1.0];
    pub const ACCENT_SHADOW: [f32; 4] = [0.1, 0.2, 0.0, 1.0];
    /// Hot magenta
    pub const SECONDARY: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
    pub const ALERT: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
    pub const ICE: [f32; 4] = [0.4, 0.85, 1.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    /// Same color with a new alpha
    pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
    }

    /// Linear blend between two colors
    pub fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        let t = t.clamp(0.0, 1.0);
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
            a[3] + (b[3] - a[3]) * t,
        ]
    }
}
