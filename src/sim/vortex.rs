//! Vortex ticker scene
//!
//! A glowing pillar races upward through streaking debris. Clicks boost the
//! thrust, which bleeds back to a baseline; a price counter climbs faster the
//! harder the vortex is pushed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{AudioCue, Scene, SceneContext, SceneEvent, SceneKind, Zone};
use crate::Bounds;
use crate::consts::SIM_DT;
use crate::error::SceneError;
use crate::input::InputSnapshot;
use crate::renderer::{Canvas, colors};

pub const BASELINE_THRUST: f32 = 20.0;
/// Multiplicative decay per tick while above baseline
pub const THRUST_DECAY: f32 = 0.95;
pub const BOOST_THRUST: f32 = 50.0;
pub const BOOST_MULTIPLIER: f64 = 0.5;
pub const STARTING_PRICE: f64 = 420.69;
/// Debris depth (parallax) range
pub const DEBRIS_MIN_DEPTH: f32 = 0.5;
pub const DEBRIS_MAX_DEPTH: f32 = 2.5;
/// Pillar half-width oscillation amplitude in pixels
pub const PILLAR_SWAY: f32 = 20.0;
/// Discharge life lost per tick
pub const DISCHARGE_DECAY: f32 = 0.1;
const DISCHARGE_STEP: f32 = 50.0;
const DISCHARGE_JITTER: f32 = 100.0;
const STRIPE_SPACING: f32 = 50.0;
const MAX_TILT: f32 = 0.05;

/// Falling debris streak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debris {
    pub pos: Vec2,
    /// Parallax depth; also the speed multiplier
    pub depth: f32,
    pub size: f32,
}

/// Jagged flash spawned by a boost
#[derive(Debug, Clone, PartialEq)]
pub struct Discharge {
    pub points: Vec<Vec2>,
    pub life: f32,
}

pub struct VortexScene {
    rng: Pcg32,
    bounds: Bounds,
    debris_count: usize,
    reduced_motion: bool,
    debris: Vec<Debris>,
    discharges: Vec<Discharge>,
    thrust: f32,
    price: f64,
    multiplier: f64,
    /// Stripe tilt from the pointer's horizontal offset, -MAX_TILT..MAX_TILT
    tilt: f32,
    stripe_phase: f32,
    ticks: u64,
    initialized: bool,
}

impl VortexScene {
    pub fn new(ctx: &SceneContext) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(ctx.seed),
            bounds: Bounds::default(),
            debris_count: ctx.settings.quality.debris_count(),
            reduced_motion: ctx.settings.reduced_motion,
            debris: Vec::new(),
            discharges: Vec::new(),
            thrust: BASELINE_THRUST,
            price: STARTING_PRICE,
            multiplier: 1.0,
            tilt: 0.0,
            stripe_phase: 0.0,
            ticks: 0,
            initialized: false,
        }
    }

    pub fn thrust(&self) -> f32 {
        self.thrust
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn debris(&self) -> &[Debris] {
        &self.debris
    }

    pub fn discharges(&self) -> &[Discharge] {
        &self.discharges
    }

    /// Percentage gain shown under the price
    pub fn gain_percent(&self) -> f64 {
        self.price / 4.2
    }

    /// Pillar face width for the current surface
    pub fn pillar_width(&self) -> f32 {
        if self.bounds.width < 600.0 { 100.0 } else { 200.0 }
    }

    /// Horizontal sway of the pillar at the current time
    pub fn sway(&self) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            (self.ticks as f32 * SIM_DT).sin() * PILLAR_SWAY
        }
    }

    fn spawn_debris(&mut self, anywhere: bool) -> Debris {
        let y = if anywhere {
            self.rng.random_range(0.0..self.bounds.height)
        } else {
            -10.0
        };
        Debris {
            pos: Vec2::new(self.rng.random_range(0.0..self.bounds.width), y),
            depth: self.rng.random_range(DEBRIS_MIN_DEPTH..=DEBRIS_MAX_DEPTH),
            size: self.rng.random_range(0.5..2.0),
        }
    }

    fn boost(&mut self, events: &mut Vec<SceneEvent>) {
        self.thrust += BOOST_THRUST;
        self.multiplier += BOOST_MULTIPLIER;

        let mut x = self.bounds.center().x;
        let mut points = vec![Vec2::new(x, 0.0)];
        let mut y = 0.0;
        while y < self.bounds.height {
            x += (self.rng.random::<f32>() - 0.5) * DISCHARGE_JITTER;
            points.push(Vec2::new(x, y));
            y += DISCHARGE_STEP;
        }
        self.discharges.push(Discharge { points, life: 1.0 });
        events.push(SceneEvent::Boost);
    }
}

/// `1234567.891` -> `"1,234,567.89"`
pub fn format_price(value: f64) -> String {
    let cents = (value.max(0.0) * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}.{:02}", grouped, cents % 100)
}

impl Scene for VortexScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Vortex
    }

    fn initialize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.debris = (0..self.debris_count)
            .map(|_| self.spawn_debris(true))
            .collect();
        self.initialized = true;
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        for d in &mut self.debris {
            d.pos.x = d.pos.x.min(bounds.width);
        }
    }

    fn step(
        &mut self,
        input: &InputSnapshot,
        events: &mut Vec<SceneEvent>,
    ) -> Result<(), SceneError> {
        if !self.initialized {
            return Err(SceneError::Uninitialized);
        }
        self.ticks += 1;

        if let Some(pos) = input.primary() {
            let center = self.bounds.center().x;
            self.tilt = ((pos.x - center) / center).clamp(-1.0, 1.0) * MAX_TILT;
        }
        for _ in &input.taps {
            self.boost(events);
        }

        if self.thrust > BASELINE_THRUST {
            self.thrust = (self.thrust * THRUST_DECAY).max(BASELINE_THRUST);
        }
        self.price += self.rng.random::<f64>() * self.thrust as f64 * self.multiplier / 10.0;
        if !self.price.is_finite() {
            return Err(SceneError::NonFinite { what: "price" });
        }

        let height = self.bounds.height;
        for i in 0..self.debris.len() {
            self.debris[i].pos.y += self.thrust * self.debris[i].depth;
            if self.debris[i].pos.y > height {
                self.debris[i] = self.spawn_debris(false);
            }
        }

        // Stripe scroll: thrust/10 pixels per millisecond of sim time
        self.stripe_phase =
            (self.stripe_phase + self.thrust / 10.0 * SIM_DT * 1000.0) % STRIPE_SPACING;

        for d in &mut self.discharges {
            d.life -= DISCHARGE_DECAY;
        }
        self.discharges.retain(|d| d.life > 0.0);
        Ok(())
    }

    fn render(&self, canvas: &mut dyn Canvas) -> Result<(), SceneError> {
        if !self.initialized {
            return Err(SceneError::Uninitialized);
        }
        let b = self.bounds;
        canvas.clear(colors::BACKGROUND);

        let streak = self.thrust / 5.0;
        let debris_color = colors::with_alpha(colors::WHITE, 0.5);
        for d in &self.debris {
            canvas.fill_rect(d.pos, Vec2::new(d.size, d.size * streak), debris_color);
        }

        let cw = self.pillar_width();
        let cx = b.width * 0.5;
        let sway = self.sway();

        // Left edge, front face, right edge
        canvas.fill_rect(
            Vec2::new(cx - cw - sway, 0.0),
            Vec2::new(cw, b.height),
            colors::ACCENT_SHADOW,
        );
        let face = cw + sway * 0.1;
        let half = Vec2::new(face * 0.5, b.height);
        canvas.fill_rect_gradient(
            Vec2::new(cx - sway, 0.0),
            half,
            colors::ACCENT_DEEP,
            colors::ACCENT,
        );
        canvas.fill_rect_gradient(
            Vec2::new(cx - sway + face * 0.5, 0.0),
            half,
            colors::ACCENT,
            colors::ACCENT_DEEP,
        );
        canvas.fill_rect(
            Vec2::new(cx + cw + sway * 0.1, 0.0),
            Vec2::new(20.0, b.height),
            colors::ACCENT_SHADOW,
        );

        let slant = -20.0 + self.tilt * 400.0;
        let stripe_color = [0.0, 0.2, 0.0, 0.5];
        let mut y = -STRIPE_SPACING;
        while y < b.height {
            let y0 = y + self.stripe_phase;
            canvas.line(
                Vec2::new(cx - cw - sway, y0),
                Vec2::new(cx + cw + 50.0, y0 + slant),
                2.0,
                stripe_color,
            );
            y += STRIPE_SPACING;
        }

        if !self.reduced_motion {
            for d in &self.discharges {
                canvas.polyline(&d.points, 3.0, colors::with_alpha(colors::WHITE, d.life));
            }
        }

        let center = b.center();
        canvas.label(center + Vec2::new(0.0, -60.0), "CURRENT PRICE", colors::ACCENT);
        canvas.label(center, &format!("${}", format_price(self.price)), colors::WHITE);
        canvas.label(
            center + Vec2::new(0.0, 48.0),
            &format!("+{:.0}% (1s)", self.gain_percent()),
            colors::ACCENT_DEEP,
        );
        Ok(())
    }

    fn teardown(&mut self) {
        self.debris.clear();
        self.discharges.clear();
        self.initialized = false;
    }

    fn audio_cue(&self) -> AudioCue {
        let energy = (0.25 + (self.thrust - BASELINE_THRUST) / 150.0).clamp(0.0, 1.0);
        AudioCue {
            energy,
            zone: Zone::classify(energy * 100.0),
            perk: None,
            silenced: false,
        }
    }

    fn status_line(&self) -> String {
        format!(
            "${}  +{:.0}% (1s)  x{:.1}",
            format_price(self.price),
            self.gain_percent(),
            self.multiplier
        )
    }
}
