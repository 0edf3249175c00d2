//! Rotating 3D node network
//!
//! Nodes sit on a spherical shell, rotate toward the primary pointer and are
//! connected by proximity edges in screen space. Clicks broadcast an
//! expanding pulse ring that lights up nodes as it passes.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::projection::{self, approach, rotate};
use super::{AudioCue, Scene, SceneContext, SceneEvent, SceneKind, Zone};
use crate::Bounds;
use crate::error::SceneError;
use crate::input::InputSnapshot;
use crate::renderer::{Canvas, colors};

/// Shell radius band in world units
pub const SHELL_MIN_RADIUS: f32 = 180.0;
pub const SHELL_MAX_RADIUS: f32 = 240.0;
/// Fraction of the remaining rotation covered per tick
pub const ROTATION_DAMPING: f32 = 0.05;
/// Constant yaw drift per tick
pub const AUTO_SPIN: f32 = 0.003;
/// Screen distance for an edge between two unit-scale nodes (at reference size)
pub const EDGE_DISTANCE: f32 = 90.0;
/// Pulse growth in pixels per tick
pub const PULSE_SPEED: f32 = 6.0;
/// Pulse life lost per tick
pub const PULSE_DECAY: f32 = 0.012;
/// Ring half-width in pixels for lighting a node
pub const PULSE_TOLERANCE: f32 = 12.0;
/// Node glow lost per tick
pub const NODE_PULSE_DECAY: f32 = 0.04;
const MAX_PULSES: usize = 8;
/// Surface edge the world-to-pixel scale is calibrated against
const REFERENCE_EDGE: f32 = 700.0;
const LABEL_SCALE: f32 = 1.15;
const LABEL_PULSE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node3D {
    pub base: Vec3,
    pub projected: Vec2,
    pub scale: f32,
    pub depth: f32,
    /// Glow from a passing pulse, 0..1
    pub pulse: f32,
}

impl Node3D {
    fn new(base: Vec3) -> Self {
        Self {
            base,
            projected: Vec2::ZERO,
            scale: 1.0,
            depth: projection::DEPTH_OFFSET,
            pulse: 0.0,
        }
    }
}

/// Expanding ring from the surface center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub radius: f32,
    pub life: f32,
}

/// Connection between two nodes (`a < b`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

/// Edge opacity between two projected nodes, if they are close enough
pub fn edge_alpha(a: &Node3D, b: &Node3D, view_scale: f32) -> Option<f32> {
    let threshold = EDGE_DISTANCE * view_scale * (a.scale + b.scale) * 0.5;
    let d = a.projected.distance(b.projected);
    if threshold > 0.0 && d < threshold {
        Some(1.0 - d / threshold)
    } else {
        None
    }
}

pub struct NodeNetworkScene {
    nodes: Vec<Node3D>,
    /// Node indices sorted far to near
    draw_order: Vec<usize>,
    edges: Vec<Edge>,
    pulses: Vec<Pulse>,
    node_count: usize,
    rng: Pcg32,
    bounds: Bounds,
    view_scale: f32,
    yaw: f32,
    pitch: f32,
    target_yaw: f32,
    target_pitch: f32,
    /// Accumulated auto-rotation, kept apart from the damped pointer yaw
    spin: f32,
    initialized: bool,
}

impl NodeNetworkScene {
    pub fn new(ctx: &SceneContext) -> Self {
        Self {
            nodes: Vec::new(),
            draw_order: Vec::new(),
            edges: Vec::new(),
            pulses: Vec::new(),
            node_count: ctx.settings.quality.node_count(),
            rng: Pcg32::seed_from_u64(ctx.seed),
            bounds: Bounds::default(),
            view_scale: 1.0,
            yaw: 0.0,
            pitch: 0.0,
            target_yaw: 0.0,
            target_pitch: 0.0,
            spin: 0.0,
            initialized: false,
        }
    }

    pub fn nodes(&self) -> &[Node3D] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }

    /// Edge opacity between nodes `i` and `j` in the current projection
    pub fn edge_between(&self, i: usize, j: usize) -> Option<f32> {
        if i == j {
            return None;
        }
        let a = self.nodes.get(i)?;
        let b = self.nodes.get(j)?;
        edge_alpha(a, b, self.view_scale)
    }

    fn update_rotation(&mut self, input: &InputSnapshot) {
        if let Some(pos) = input.primary() {
            let n = self.bounds.normalize(pos);
            self.target_yaw = (n.x - 0.5) * PI;
            self.target_pitch = (n.y - 0.5) * PI * 0.5;
        }
        self.yaw = approach(self.yaw, self.target_yaw, ROTATION_DAMPING);
        self.pitch = approach(self.pitch, self.target_pitch, ROTATION_DAMPING);
        self.spin = (self.spin + AUTO_SPIN) % std::f32::consts::TAU;
    }

    fn project_nodes(&mut self) {
        let center = self.bounds.center();
        let yaw = self.yaw + self.spin;
        for node in &mut self.nodes {
            let rotated = rotate(node.base, yaw, self.pitch);
            let p = projection::project(rotated, center, self.view_scale);
            node.projected = p.pos;
            node.scale = p.scale;
            node.depth = p.depth;
        }
        let nodes = &self.nodes;
        self.draw_order
            .sort_by(|&a, &b| nodes[b].depth.total_cmp(&nodes[a].depth));
    }

    fn rebuild_edges(&mut self) {
        self.edges.clear();
        for i in 0..self.nodes.len() {
            for j in (i + 1)..self.nodes.len() {
                if let Some(alpha) = edge_alpha(&self.nodes[i], &self.nodes[j], self.view_scale) {
                    self.edges.push(Edge { a: i, b: j, alpha });
                }
            }
        }
    }

    fn update_pulses(&mut self, input: &InputSnapshot, events: &mut Vec<SceneEvent>) {
        for _ in &input.taps {
            if self.pulses.len() < MAX_PULSES {
                self.pulses.push(Pulse {
                    radius: 0.0,
                    life: 1.0,
                });
                events.push(SceneEvent::PulseBroadcast);
            }
        }

        for node in &mut self.nodes {
            node.pulse = (node.pulse - NODE_PULSE_DECAY).max(0.0);
        }

        let center = self.bounds.center();
        for pulse in &mut self.pulses {
            pulse.radius += PULSE_SPEED;
            pulse.life -= PULSE_DECAY;
            for node in &mut self.nodes {
                let d = node.projected.distance(center);
                if (d - pulse.radius).abs() < PULSE_TOLERANCE {
                    node.pulse = 1.0;
                }
            }
        }

        let limit = self.bounds.half_diagonal();
        self.pulses.retain(|p| p.life > 0.0 && p.radius <= limit);
    }

    fn activity(&self) -> f32 {
        ((self.target_yaw - self.yaw).abs() + (self.target_pitch - self.pitch).abs()).min(1.0)
    }

    fn mean_pulse(&self) -> f32 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.iter().map(|n| n.pulse).sum::<f32>() / self.nodes.len() as f32
    }
}

impl Scene for NodeNetworkScene {
    fn kind(&self) -> SceneKind {
        SceneKind::NodeNetwork
    }

    fn initialize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.view_scale = bounds.min_edge() / REFERENCE_EDGE;
        self.nodes = (0..self.node_count)
            .map(|_| {
                Node3D::new(projection::sample_shell(
                    &mut self.rng,
                    SHELL_MIN_RADIUS,
                    SHELL_MAX_RADIUS,
                ))
            })
            .collect();
        self.draw_order = (0..self.nodes.len()).collect();
        self.project_nodes();
        self.rebuild_edges();
        self.initialized = true;
        log::debug!("Node network initialized: {} nodes", self.nodes.len());
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.view_scale = bounds.min_edge() / REFERENCE_EDGE;
        self.project_nodes();
        self.rebuild_edges();
    }

    fn step(
        &mut self,
        input: &InputSnapshot,
        events: &mut Vec<SceneEvent>,
    ) -> Result<(), SceneError> {
        if !self.initialized {
            return Err(SceneError::Uninitialized);
        }
        self.update_rotation(input);
        if !(self.yaw.is_finite() && self.pitch.is_finite()) {
            return Err(SceneError::NonFinite { what: "rotation" });
        }
        self.project_nodes();
        self.rebuild_edges();
        self.update_pulses(input, events);
        Ok(())
    }

    fn render(&self, canvas: &mut dyn Canvas) -> Result<(), SceneError> {
        if !self.initialized {
            return Err(SceneError::Uninitialized);
        }
        canvas.clear(colors::BACKGROUND);

        for edge in &self.edges {
            let a = &self.nodes[edge.a];
            let b = &self.nodes[edge.b];
            let glow = a.pulse.max(b.pulse);
            let color = colors::mix(colors::ACCENT_DEEP, colors::SECONDARY, glow);
            canvas.line(a.projected, b.projected, 1.0, colors::with_alpha(color, edge.alpha * 0.6));
        }

        let center = self.bounds.center();
        for pulse in &self.pulses {
            canvas.stroke_circle(
                center,
                pulse.radius,
                2.0,
                colors::with_alpha(colors::SECONDARY, pulse.life),
            );
        }

        for &i in &self.draw_order {
            let node = &self.nodes[i];
            let radius = 3.0 * node.scale * self.view_scale;
            let shade = (node.scale - 0.5).clamp(0.2, 1.0);
            let color = colors::mix(
                colors::with_alpha(colors::ACCENT, shade),
                colors::WHITE,
                node.pulse,
            );
            canvas.fill_circle(node.projected, radius, color);
            if node.scale > LABEL_SCALE || node.pulse > LABEL_PULSE {
                canvas.label(
                    node.projected + Vec2::new(6.0, -6.0),
                    &format!("N{:03}", i),
                    colors::with_alpha(colors::WHITE, shade),
                );
            }
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.nodes.clear();
        self.draw_order.clear();
        self.edges.clear();
        self.pulses.clear();
        self.initialized = false;
    }

    fn audio_cue(&self) -> AudioCue {
        let energy = (0.08 + self.mean_pulse() * 0.6 + self.activity() * 0.4).clamp(0.0, 1.0);
        AudioCue {
            energy,
            zone: Zone::classify(energy * 100.0),
            perk: None,
            silenced: false,
        }
    }

    fn status_line(&self) -> String {
        format!(
            "NODES {}  LINKS {}  PULSES {}",
            self.nodes.len(),
            self.edges.len(),
            self.pulses.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::ScoreStore;
    use crate::input::{PointerId, PointerState};
    use crate::persistence::MemoryStore;
    use crate::settings::ArenaSettings;
    use proptest::prelude::*;

    fn scene(seed: u64) -> NodeNetworkScene {
        let ctx = SceneContext {
            seed,
            scores: ScoreStore::new(MemoryStore::new().shared()),
            settings: ArenaSettings::default(),
        };
        let mut scene = NodeNetworkScene::new(&ctx);
        scene.initialize(Bounds::new(800.0, 600.0));
        scene
    }

    fn pointer_at(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot {
            pointers: vec![PointerState {
                id: PointerId::Mouse,
                pos: Vec2::new(x, y),
                displacement: 0.0,
            }],
            taps: vec![],
            interacted: true,
        }
    }

    #[test]
    fn test_node_count_follows_quality() {
        let s = scene(1);
        assert_eq!(
            s.nodes().len(),
            ArenaSettings::default().quality.node_count()
        );
    }

    #[test]
    fn test_draw_order_far_to_near() {
        let mut s = scene(2);
        let mut events = Vec::new();
        s.step(&pointer_at(100.0, 500.0), &mut events).unwrap();
        let depths: Vec<f32> = s.draw_order().iter().map(|&i| s.nodes()[i].depth).collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_rotation_damps_toward_pointer() {
        let mut s = scene(3);
        let mut events = Vec::new();
        let input = pointer_at(800.0, 300.0);
        s.step(&input, &mut events).unwrap();
        let first = s.yaw;
        assert!(first > 0.0 && first < PI * 0.5);
        for _ in 0..300 {
            s.step(&input, &mut events).unwrap();
        }
        assert!((s.yaw - PI * 0.5).abs() < 1e-3);
        // Releasing the pointer keeps the last target
        s.step(&InputSnapshot::default(), &mut events).unwrap();
        assert!((s.yaw - PI * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_tap_broadcasts_pulse() {
        let mut s = scene(4);
        let mut events = Vec::new();
        let tap = InputSnapshot {
            taps: vec![Vec2::new(10.0, 10.0)],
            interacted: true,
            ..Default::default()
        };
        s.step(&tap, &mut events).unwrap();
        assert_eq!(events, vec![SceneEvent::PulseBroadcast]);
        assert_eq!(s.pulses().len(), 1);

        let mut lit = false;
        let mut last_radius = s.pulses()[0].radius;
        for _ in 0..60 {
            s.step(&InputSnapshot::default(), &mut events).unwrap();
            if let Some(p) = s.pulses().first() {
                assert!(p.radius > last_radius);
                last_radius = p.radius;
            }
            lit |= s.nodes().iter().any(|n| n.pulse == 1.0);
        }
        assert!(lit);

        for _ in 0..200 {
            s.step(&InputSnapshot::default(), &mut events).unwrap();
        }
        assert!(s.pulses().is_empty());
        assert!(s.nodes().iter().all(|n| n.pulse == 0.0));
    }

    #[test]
    fn test_pulse_cap() {
        let mut s = scene(5);
        let mut events = Vec::new();
        let taps = InputSnapshot {
            taps: vec![Vec2::ZERO; 20],
            interacted: true,
            ..Default::default()
        };
        s.step(&taps, &mut events).unwrap();
        assert_eq!(s.pulses().len(), MAX_PULSES);
        assert_eq!(events.len(), MAX_PULSES);
    }

    #[test]
    fn test_render_labels_some_nodes() {
        let s = scene(6);
        let mut canvas = crate::renderer::VertexCanvas::new(Bounds::new(800.0, 600.0));
        s.render(&mut canvas).unwrap();
        assert!(!canvas.vertices().is_empty());
    }

    proptest! {
        #[test]
        fn prop_edges_symmetric_without_self_loops(
            seed in any::<u64>(),
            px in 0.0f32..800.0,
            py in 0.0f32..600.0,
            ticks in 1usize..20,
        ) {
            let mut s = scene(seed);
            let mut events = Vec::new();
            for _ in 0..ticks {
                s.step(&pointer_at(px, py), &mut events).unwrap();
            }
            let n = s.nodes().len();
            for i in 0..n {
                prop_assert!(s.edge_between(i, i).is_none());
                for j in 0..n {
                    prop_assert_eq!(s.edge_between(i, j), s.edge_between(j, i));
                }
            }
            for e in s.edges() {
                prop_assert!(e.a < e.b);
                prop_assert!(e.alpha > 0.0 && e.alpha <= 1.0);
            }
        }
    }
}
