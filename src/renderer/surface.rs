//! Rendering surfaces handed to the host on enter

use super::canvas::{Canvas, VertexCanvas};
use super::pipeline::RenderState;
use crate::Bounds;
use crate::error::RenderError;

/// A 2D drawing target of known size
pub trait RenderSurface {
    /// Current backing size in pixels
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32);
    /// Start a frame and get the canvas to draw it on
    fn begin_frame(&mut self, bounds: Bounds) -> &mut dyn Canvas;
    /// Submit the frame drawn since `begin_frame`
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Surface that tessellates frames without displaying them
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    canvas: VertexCanvas,
    size: (u32, u32),
    frames_presented: u64,
    last_vertex_count: usize,
    last_label_count: usize,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: VertexCanvas::new(Bounds::new(width as f32, height as f32)),
            size: (width, height),
            ..Default::default()
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn last_vertex_count(&self) -> usize {
        self.last_vertex_count
    }

    pub fn last_label_count(&self) -> usize {
        self.last_label_count
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn begin_frame(&mut self, bounds: Bounds) -> &mut dyn Canvas {
        self.canvas.reset(bounds);
        &mut self.canvas
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.frames_presented += 1;
        self.last_vertex_count = self.canvas.vertices().len();
        self.last_label_count = self.canvas.labels().len();
        Ok(())
    }
}

/// WebGPU-backed surface
pub struct GpuSurface {
    state: RenderState,
    canvas: VertexCanvas,
}

impl GpuSurface {
    pub fn new(state: RenderState) -> Self {
        let (w, h) = state.size;
        Self {
            state,
            canvas: VertexCanvas::new(Bounds::new(w as f32, h as f32)),
        }
    }

    /// Labels drawn during the last frame (glyphs go to a DOM overlay)
    pub fn labels(&self) -> &[super::canvas::TextLabel] {
        self.canvas.labels()
    }
}

impl RenderSurface for GpuSurface {
    fn size(&self) -> (u32, u32) {
        self.state.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.state.resize(width, height);
    }

    fn begin_frame(&mut self, bounds: Bounds) -> &mut dyn Canvas {
        self.canvas.reset(bounds);
        &mut self.canvas
    }

    fn present(&mut self) -> Result<(), RenderError> {
        match self
            .state
            .render(self.canvas.vertices(), self.canvas.clear_color())
        {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost) => {
                let (w, h) = self.state.size;
                self.state.resize(w, h);
                Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(RenderError::OutOfMemory),
            Err(e) => Err(RenderError::Other(format!("{:?}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_headless_counts_frames() {
        let mut surface = HeadlessSurface::new(320, 240);
        let canvas = surface.begin_frame(Bounds::new(320.0, 240.0));
        canvas.fill_rect(Vec2::ZERO, Vec2::splat(4.0), [1.0; 4]);
        surface.present().unwrap();
        assert_eq!(surface.frames_presented(), 1);
        assert_eq!(surface.last_vertex_count(), 6);

        surface.begin_frame(Bounds::new(320.0, 240.0));
        surface.present().unwrap();
        assert_eq!(surface.last_vertex_count(), 0);
    }
}
