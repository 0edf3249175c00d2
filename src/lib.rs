//! Entropy Arena - full-screen interactive takeover
//!
//! Core modules:
//! - `host`: Simulation host (frame loop, lifecycle, scene slot)
//! - `input`: Multi-pointer input tracking
//! - `sim`: Scenes (energy field survival game, node network, vortex ticker)
//! - `audio`: Procedural audio feedback engine
//! - `renderer`: 2D canvas abstraction and WebGPU pipeline
//! - `platform`: Browser/headless platform abstraction
//! - `persistence`: Key-value storage backends
//! - `highscores`: All-time-high score record

pub mod audio;
pub mod error;
pub mod highscores;
pub mod host;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ArenaError, AudioError, RenderError, SceneError, StoreError};
pub use highscores::ScoreStore;
pub use host::{Lifecycle, SimulationHost};
pub use input::{InputSnapshot, InputTracker, PointerId, PointerState};
pub use settings::{ArenaSettings, QualityPreset};

use glam::Vec2;

/// Arena configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame on most devices)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame gap fed into the accumulator (seconds)
    pub const MAX_FRAME_GAP: f32 = 0.1;

    /// Smallest usable surface edge in pixels
    pub const MIN_SURFACE_EDGE: f32 = 64.0;
}

/// Pixel dimensions of the rendering surface, clamped to a usable minimum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Build bounds from raw surface size; degenerate sizes are clamped
    pub fn new(width: f32, height: f32) -> Self {
        let clamp = |v: f32| {
            if v.is_finite() {
                v.max(consts::MIN_SURFACE_EDGE)
            } else {
                consts::MIN_SURFACE_EDGE
            }
        };
        Self {
            width: clamp(width),
            height: clamp(height),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn half_diagonal(&self) -> f32 {
        Vec2::new(self.width, self.height).length() * 0.5
    }

    pub fn min_edge(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Position normalized to [0, 1] on both axes
    pub fn normalize(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            (pos.x / self.width).clamp(0.0, 1.0),
            (pos.y / self.height).clamp(0.0, 1.0),
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_clamp_degenerate() {
        let b = Bounds::new(0.0, -5.0);
        assert_eq!(b.width, consts::MIN_SURFACE_EDGE);
        assert_eq!(b.height, consts::MIN_SURFACE_EDGE);

        let b = Bounds::new(f32::NAN, 1024.0);
        assert_eq!(b.width, consts::MIN_SURFACE_EDGE);
        assert_eq!(b.height, 1024.0);
    }

    #[test]
    fn test_bounds_normalize() {
        let b = Bounds::new(200.0, 100.0);
        let n = b.normalize(Vec2::new(100.0, 150.0));
        assert!((n.x - 0.5).abs() < 1e-6);
        assert_eq!(n.y, 1.0);
    }
}
