//! Energy grid physics
//!
//! A uniform grid of scalar energy cells charged by nearby pointers and
//! drained by a decay that grows with the field's own average.

use glam::Vec2;

use super::entropy::PerkKind;
use crate::Bounds;
use crate::input::PointerState;

/// Upper bound for any cell
pub const MAX_ENERGY: f32 = 100.0;

/// Influence radius in pixels
pub const INFLUENCE_RADIUS: f32 = 150.0;
/// Influence radius while BoostRange is active
pub const BOOST_RADIUS: f32 = 240.0;
/// Contribution at distance zero from a still pointer
pub const BASE_SENSITIVITY: f32 = 0.6;
pub const BOOST_SENSITIVITY: f32 = 1.2;
/// Per-event displacement above this adds nothing
pub const DISPLACEMENT_CAP: f32 = 40.0;
/// Displacement divisor; a capped flick adds `CAP / SCALE` on top of sensitivity
pub const DISPLACEMENT_SCALE: f32 = 10.0;
/// Flat per-tick drain
pub const BASE_DECAY: f32 = 0.15;
/// Extra drain per unit of average energy
pub const AVERAGE_DRAG: f32 = 0.004;

/// Tunables for one energy update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldPhysics {
    pub radius: f32,
    pub sensitivity: f32,
    pub base_decay: f32,
    /// Multiplier on the field average added to the decay
    pub drag: f32,
    /// Freeze: no decay at all
    pub frozen: bool,
}

impl Default for FieldPhysics {
    fn default() -> Self {
        Self {
            radius: INFLUENCE_RADIUS,
            sensitivity: BASE_SENSITIVITY,
            base_decay: BASE_DECAY,
            drag: AVERAGE_DRAG,
            frozen: false,
        }
    }
}

impl FieldPhysics {
    /// Physics in effect for the given active perk
    pub fn for_perk(perk: Option<PerkKind>) -> Self {
        match perk {
            None => Self::default(),
            Some(PerkKind::BoostRange) => Self {
                radius: BOOST_RADIUS,
                sensitivity: BOOST_SENSITIVITY,
                drag: 0.0,
                ..Self::default()
            },
            Some(PerkKind::Freeze) => Self {
                frozen: true,
                ..Self::default()
            },
        }
    }

    /// Amount drained from every cell given the current average
    pub fn decay(&self, average: f32) -> f32 {
        if self.frozen {
            0.0
        } else {
            self.base_decay + average * self.drag
        }
    }
}

/// Energy added to a cell at `cell` by a pointer at `pointer`.
///
/// Non-negative everywhere and exactly zero at or beyond `radius`.
pub fn influence(cell: Vec2, pointer: Vec2, displacement: f32, physics: &FieldPhysics) -> f32 {
    let d = cell.distance(pointer);
    if !(d < physics.radius) || physics.radius <= 0.0 {
        return 0.0;
    }
    let motion = displacement.clamp(0.0, DISPLACEMENT_CAP) / DISPLACEMENT_SCALE;
    let falloff = (physics.radius - d) / physics.radius;
    (falloff * (physics.sensitivity + motion)).max(0.0)
}

/// Uniform grid of energy cells
#[derive(Debug, Clone, Default)]
pub struct EnergyField {
    cols: usize,
    rows: usize,
    cell_size: f32,
    cells: Vec<f32>,
}

impl EnergyField {
    /// Grid covering `bounds` with square cells; all energy zero
    pub fn new(bounds: Bounds, cell_size: f32) -> Self {
        let cell_size = cell_size.max(4.0);
        let cols = (bounds.width / cell_size).ceil().max(1.0) as usize;
        let rows = (bounds.height / cell_size).ceil().max(1.0) as usize;
        Self {
            cols,
            rows,
            cell_size,
            cells: vec![0.0; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col < self.cols && row < self.rows {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Overwrite one cell, clamped
    pub fn set(&mut self, col: usize, row: usize, energy: f32) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = energy.clamp(0.0, MAX_ENERGY);
        }
    }

    pub fn cell_center(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(
            (col as f32 + 0.5) * self.cell_size,
            (row as f32 + 0.5) * self.cell_size,
        )
    }

    pub fn average(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().sum::<f32>() / self.cells.len() as f32
    }

    pub fn zero(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0.0);
    }

    /// One energy update: charge from pointers, then decay, then clamp
    pub fn step(&mut self, pointers: &[PointerState], physics: &FieldPhysics) {
        let decay = physics.decay(self.average());
        for row in 0..self.rows {
            for col in 0..self.cols {
                let center = self.cell_center(col, row);
                let gain: f32 = pointers
                    .iter()
                    .map(|p| influence(center, p.pos, p.displacement, physics))
                    .sum();
                let idx = row * self.cols + col;
                self.cells[idx] = (self.cells[idx] + gain - decay).clamp(0.0, MAX_ENERGY);
            }
        }
    }

    /// Re-grid for a new surface size, sampling the old grid nearest-neighbour
    pub fn resample(&mut self, bounds: Bounds) {
        let mut next = EnergyField::new(bounds, self.cell_size);
        if self.cells.is_empty() {
            *self = next;
            return;
        }
        for row in 0..next.rows {
            for col in 0..next.cols {
                let src_col = (col * self.cols / next.cols).min(self.cols - 1);
                let src_row = (row * self.rows / next.rows).min(self.rows - 1);
                next.cells[row * next.cols + col] = self.cells[src_row * self.cols + src_col];
            }
        }
        *self = next;
    }
}
