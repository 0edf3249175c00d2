//! Rendering module
//!
//! Scenes draw through the `Canvas` trait in pixel space; the vertex canvas
//! tessellates to triangles that the WebGPU pipeline uploads each frame.

pub mod canvas;
pub mod pipeline;
pub mod shapes;
pub mod surface;
pub mod vertex;

pub use canvas::{Canvas, Color, TextLabel, VertexCanvas};
pub use pipeline::RenderState;
pub use surface::{GpuSurface, HeadlessSurface, RenderSurface};
pub use vertex::{Vertex, colors};
