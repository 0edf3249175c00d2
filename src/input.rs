//! Multi-pointer input tracking
//!
//! Event handlers write here; the host reads one snapshot per tick. Scenes
//! never see raw events.

use std::collections::BTreeMap;

use glam::Vec2;

/// Identity of a contact point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PointerId {
    /// Reserved pseudo-id for the (single) mouse/pen device
    Mouse,
    /// Touch contact, keyed by the platform's touch identifier
    Touch(i32),
}

/// A live contact point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub id: PointerId,
    pub pos: Vec2,
    /// Distance moved since the previous event for this id.
    ///
    /// This is a raw per-event delta, not a velocity: devices that dispatch
    /// move events more often report smaller values for the same gesture.
    /// The field feel of the arena was tuned against it, so it stays.
    pub displacement: f32,
}

/// One consistent view of input for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Active pointers in stable id order (mouse first)
    pub pointers: Vec<PointerState>,
    /// Click/tap positions since the previous snapshot
    pub taps: Vec<Vec2>,
    /// Any input event arrived since the previous snapshot
    pub interacted: bool,
}

impl InputSnapshot {
    /// Position of the steering pointer: mouse if present, else lowest touch id
    pub fn primary(&self) -> Option<Vec2> {
        self.pointers.first().map(|p| p.pos)
    }
}

/// Live map of active contact points
#[derive(Debug, Default)]
pub struct InputTracker {
    pointers: BTreeMap<PointerId, PointerState>,
    taps: Vec<Vec2>,
    interacted: bool,
}

/// Cap on queued taps between snapshots (a stalled frame loop must not grow this forever)
const MAX_QUEUED_TAPS: usize = 32;

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contact begins: entry with zero displacement
    pub fn begin(&mut self, id: PointerId, pos: Vec2) {
        self.pointers.insert(
            id,
            PointerState {
                id,
                pos,
                displacement: 0.0,
            },
        );
        self.interacted = true;
    }

    /// Contact moves: displacement is the distance from the previous position
    pub fn move_to(&mut self, id: PointerId, pos: Vec2) {
        match self.pointers.get_mut(&id) {
            Some(state) => {
                state.displacement = state.pos.distance(pos);
                state.pos = pos;
            }
            // Hover without a prior begin (mouse entering the surface)
            None => {
                self.pointers.insert(
                    id,
                    PointerState {
                        id,
                        pos,
                        displacement: 0.0,
                    },
                );
            }
        }
        self.interacted = true;
    }

    /// Contact ends normally
    pub fn end(&mut self, id: PointerId) {
        self.pointers.remove(&id);
        self.interacted = true;
    }

    /// Contact cancelled by the platform
    pub fn cancel(&mut self, id: PointerId) {
        self.pointers.remove(&id);
    }

    /// Discrete click/tap
    pub fn tap(&mut self, pos: Vec2) {
        if self.taps.len() < MAX_QUEUED_TAPS {
            self.taps.push(pos);
        }
        self.interacted = true;
    }

    /// Drop everything (used on exit so a re-entered host starts clean)
    pub fn clear(&mut self) {
        self.pointers.clear();
        self.taps.clear();
        self.interacted = false;
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn get(&self, id: PointerId) -> Option<&PointerState> {
        self.pointers.get(&id)
    }

    /// Take this tick's snapshot; drains queued taps and the interaction flag
    pub fn snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            pointers: self.pointers.values().copied().collect(),
            taps: std::mem::take(&mut self.taps),
            interacted: std::mem::replace(&mut self.interacted, false),
        }
    }
}
