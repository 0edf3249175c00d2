//! Entropy field survival scene
//!
//! Pointers charge a grid of energy cells; the grid drains on its own. Once a
//! session has started the player must keep the average above zero. Drifting
//! items grant a temporary perk when a pointer catches them.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::field::{BOOST_RADIUS, EnergyField, FieldPhysics, INFLUENCE_RADIUS, MAX_ENERGY};
use super::{AudioCue, Scene, SceneContext, SceneEvent, SceneKind, Zone};
use crate::Bounds;
use crate::error::SceneError;
use crate::highscores::ScoreStore;
use crate::input::InputSnapshot;
use crate::renderer::{Canvas, colors};

/// Perk lifetime in ticks (10 seconds at 60 Hz)
pub const PERK_TTL_TICKS: u32 = 600;
/// Spawner countdown range in ticks
pub const SPAWN_MIN_TICKS: u32 = 480;
pub const SPAWN_MAX_TICKS: u32 = 960;
/// Pointer-to-item distance that counts as a catch
pub const CATCH_RADIUS: f32 = 60.0;
/// Horizontal item speed in pixels per tick
pub const ITEM_SPEED: f32 = 4.0;
/// Maximum trail points kept per item
pub const ITEM_TRAIL_LENGTH: usize = 14;
/// Distance past an edge before an item is discarded
pub const ITEM_EDGE_MARGIN: f32 = 40.0;
const ITEM_RADIUS: f32 = 12.0;

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    /// Waiting for first input; the grid is inert
    Idle,
    /// Session running
    Active,
    /// Average energy hit zero; grid frozen until retry
    GameOver,
}

/// Temporary modifier granted by catching an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerkKind {
    /// Larger influence radius and sensitivity, no average drag
    BoostRange,
    /// No decay at all
    Freeze,
}

impl PerkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerkKind::BoostRange => "BOOST",
            PerkKind::Freeze => "FREEZE",
        }
    }

    fn color(&self) -> [f32; 4] {
        match self {
            PerkKind::BoostRange => colors::SECONDARY,
            PerkKind::Freeze => colors::ICE,
        }
    }
}

/// Active perk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perk {
    pub kind: PerkKind,
    pub remaining_ticks: u32,
}

/// Drifting pickup
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveItem {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: PerkKind,
    /// Trail history for rendering (newest first)
    pub trail: Vec<Vec2>,
}

impl ActiveItem {
    fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > ITEM_TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    fn out_of_bounds(&self, bounds: Bounds) -> bool {
        self.pos.x < -ITEM_EDGE_MARGIN
            || self.pos.x > bounds.width + ITEM_EDGE_MARGIN
            || self.pos.y < -ITEM_EDGE_MARGIN
            || self.pos.y > bounds.height + ITEM_EDGE_MARGIN
    }
}

pub struct EntropyFieldScene {
    phase: FieldPhase,
    bounds: Bounds,
    field: EnergyField,
    cell_size: f32,
    initialized: bool,
    rng: Pcg32,
    perk: Option<Perk>,
    item: Option<ActiveItem>,
    spawn_countdown: u32,
    average: f32,
    zone: Zone,
    /// Highest average energy reached this session
    session_peak: f32,
    best: f64,
    last_new_record: bool,
    scores: ScoreStore,
    /// Latest pointer positions, for drawing influence rings
    pointers: Vec<Vec2>,
}

impl EntropyFieldScene {
    pub fn new(ctx: &SceneContext) -> Self {
        let mut rng = Pcg32::seed_from_u64(ctx.seed);
        let spawn_countdown = rng.random_range(SPAWN_MIN_TICKS..=SPAWN_MAX_TICKS);
        Self {
            phase: FieldPhase::Idle,
            bounds: Bounds::default(),
            field: EnergyField::default(),
            cell_size: ctx.settings.quality.cell_size(),
            initialized: false,
            rng,
            perk: None,
            item: None,
            spawn_countdown,
            average: 0.0,
            zone: Zone::Dormant,
            session_peak: 0.0,
            best: ctx.scores.get(),
            last_new_record: false,
            scores: ctx.scores.clone(),
            pointers: Vec::new(),
        }
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    pub fn field(&self) -> &EnergyField {
        &self.field
    }

    pub fn perk(&self) -> Option<Perk> {
        self.perk
    }

    pub fn item(&self) -> Option<&ActiveItem> {
        self.item.as_ref()
    }

    pub fn spawn_countdown(&self) -> u32 {
        self.spawn_countdown
    }

    pub fn average(&self) -> f32 {
        self.average
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn session_peak(&self) -> f32 {
        self.session_peak
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    /// Place an item directly; refused while another item exists
    pub fn spawn_item(&mut self, kind: PerkKind, pos: Vec2, vel: Vec2) -> bool {
        if self.item.is_some() {
            return false;
        }
        self.item = Some(ActiveItem {
            pos,
            vel,
            kind,
            trail: Vec::with_capacity(ITEM_TRAIL_LENGTH + 1),
        });
        true
    }

    fn reset_spawn_countdown(&mut self) {
        self.spawn_countdown = self.rng.random_range(SPAWN_MIN_TICKS..=SPAWN_MAX_TICKS);
    }

    fn tick_perk(&mut self, events: &mut Vec<SceneEvent>) {
        if let Some(perk) = &mut self.perk {
            perk.remaining_ticks = perk.remaining_ticks.saturating_sub(1);
            if perk.remaining_ticks == 0 {
                events.push(SceneEvent::PerkExpired(perk.kind));
                self.perk = None;
            }
        }
    }

    fn tick_spawner(&mut self, events: &mut Vec<SceneEvent>) {
        // Countdown only runs while the stage is empty
        if self.item.is_some() {
            return;
        }
        self.spawn_countdown = self.spawn_countdown.saturating_sub(1);
        if self.spawn_countdown > 0 {
            return;
        }

        let kind = if self.rng.random_bool(0.5) {
            PerkKind::BoostRange
        } else {
            PerkKind::Freeze
        };
        let from_left = self.rng.random_bool(0.5);
        let y = self
            .rng
            .random_range(self.bounds.height * 0.2..=self.bounds.height * 0.8);
        let drift = self.rng.random_range(-0.5f32..=0.5);
        let (x, vx) = if from_left {
            (0.0, ITEM_SPEED)
        } else {
            (self.bounds.width, -ITEM_SPEED)
        };
        if self.spawn_item(kind, Vec2::new(x, y), Vec2::new(vx, drift)) {
            log::debug!(
                "Item spawned: {:?} from the {} edge",
                kind,
                if from_left { "left" } else { "right" }
            );
            events.push(SceneEvent::ItemSpawned(kind));
        }
        self.reset_spawn_countdown();
    }

    fn tick_item(&mut self, input: &InputSnapshot, events: &mut Vec<SceneEvent>) {
        let Some(item) = &mut self.item else {
            return;
        };
        item.record_trail();
        item.pos += item.vel;

        let caught = input
            .pointers
            .iter()
            .any(|p| p.pos.distance(item.pos) <= CATCH_RADIUS);
        if caught {
            let kind = item.kind;
            self.item = None;
            self.perk = Some(Perk {
                kind,
                remaining_ticks: PERK_TTL_TICKS,
            });
            log::debug!("Perk activated: {:?}", kind);
            events.push(SceneEvent::ItemCaught(kind));
        } else if item.out_of_bounds(self.bounds) {
            self.item = None;
        }
    }

    fn end_session(&mut self, events: &mut Vec<SceneEvent>) {
        self.phase = FieldPhase::GameOver;
        let peak = self.session_peak;
        self.last_new_record = self.scores.record_if_higher(peak as f64);
        self.best = self.scores.get();
        log::info!(
            "Session over: peak {:.1}{}",
            peak,
            if self.last_new_record { " (new record)" } else { "" }
        );
        events.push(SceneEvent::GameOver {
            peak,
            new_record: self.last_new_record,
        });
    }

    fn active_step(&mut self, input: &InputSnapshot, events: &mut Vec<SceneEvent>) {
        self.tick_perk(events);
        self.tick_spawner(events);
        self.tick_item(input, events);

        let physics = FieldPhysics::for_perk(self.perk.map(|p| p.kind));
        self.field.step(&input.pointers, &physics);

        self.average = self.field.average();
        self.session_peak = self.session_peak.max(self.average);
        self.zone = Zone::classify(self.average);

        if self.average <= 0.0 {
            self.end_session(events);
        }
    }

    fn influence_radius(&self) -> f32 {
        match self.perk.map(|p| p.kind) {
            Some(PerkKind::BoostRange) => BOOST_RADIUS,
            _ => INFLUENCE_RADIUS,
        }
    }
}

impl Scene for EntropyFieldScene {
    fn kind(&self) -> SceneKind {
        SceneKind::EntropyField
    }

    fn initialize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.field = EnergyField::new(bounds, self.cell_size);
        self.initialized = true;
        log::debug!(
            "Entropy field initialized: {}x{} cells",
            self.field.cols(),
            self.field.rows()
        );
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.field.resample(bounds);
    }

    fn step(
        &mut self,
        input: &InputSnapshot,
        events: &mut Vec<SceneEvent>,
    ) -> Result<(), SceneError> {
        if !self.initialized {
            return Err(SceneError::Uninitialized);
        }
        self.pointers.clear();
        self.pointers.extend(input.pointers.iter().map(|p| p.pos));

        match self.phase {
            FieldPhase::Idle => {
                // A pointer left resting from the last session does not count
                if input.interacted {
                    self.phase = FieldPhase::Active;
                    self.session_peak = 0.0;
                    self.last_new_record = false;
                    log::debug!("Session started");
                    events.push(SceneEvent::SessionStarted);
                    self.active_step(input, events);
                }
            }
            FieldPhase::Active => self.active_step(input, events),
            FieldPhase::GameOver => {}
        }

        if !self.average.is_finite() {
            return Err(SceneError::NonFinite {
                what: "field average",
            });
        }
        Ok(())
    }

    fn render(&self, canvas: &mut dyn Canvas) -> Result<(), SceneError> {
        if !self.initialized {
            return Err(SceneError::Uninitialized);
        }
        canvas.clear(colors::BACKGROUND);

        let size = self.field.cell_size();
        let tint = self.zone.color();
        for row in 0..self.field.rows() {
            for col in 0..self.field.cols() {
                let energy = self.field.get(col, row).unwrap_or(0.0);
                if energy < 0.5 {
                    continue;
                }
                let t = energy / MAX_ENERGY;
                let color = colors::mix(colors::ACCENT_SHADOW, tint, t);
                let min = Vec2::new(col as f32 * size, row as f32 * size);
                canvas.fill_rect(
                    min + 1.0,
                    Vec2::splat(size - 2.0),
                    colors::with_alpha(color, 0.25 + t * 0.75),
                );
            }
        }

        if let Some(Perk {
            kind: PerkKind::Freeze,
            ..
        }) = self.perk
        {
            let b = canvas.bounds();
            canvas.fill_rect(
                Vec2::ZERO,
                Vec2::new(b.width, b.height),
                colors::with_alpha(colors::ICE, 0.08),
            );
        }

        let ring_color = match self.perk {
            Some(perk) => perk.kind.color(),
            None => colors::ACCENT,
        };
        let radius = self.influence_radius();
        for &p in &self.pointers {
            canvas.stroke_circle(p, radius, 1.5, colors::with_alpha(ring_color, 0.25));
            canvas.fill_circle(p, 4.0, ring_color);
        }

        if let Some(item) = &self.item {
            let color = item.kind.color();
            canvas.trail(&item.trail, ITEM_RADIUS, colors::with_alpha(color, 0.6));
            canvas.fill_circle(item.pos, ITEM_RADIUS, color);
            canvas.stroke_circle(item.pos, ITEM_RADIUS + 6.0, 2.0, colors::WHITE);
            canvas.label(item.pos + Vec2::new(-20.0, -24.0), item.kind.as_str(), color);
        }

        let center = self.bounds.center();
        match self.phase {
            FieldPhase::Idle => {
                canvas.label(center, "TOUCH TO CHARGE", colors::ACCENT);
            }
            FieldPhase::GameOver => {
                let b = canvas.bounds();
                canvas.fill_rect(
                    Vec2::ZERO,
                    Vec2::new(b.width, b.height),
                    colors::with_alpha(colors::ALERT, 0.15),
                );
                canvas.label(center, "FIELD COLLAPSED", colors::ALERT);
                let summary = if self.last_new_record {
                    format!("NEW RECORD {:.1}", self.session_peak)
                } else {
                    format!("PEAK {:.1}  BEST {:.1}", self.session_peak, self.best)
                };
                canvas.label(center + Vec2::new(0.0, 32.0), &summary, colors::WHITE);
            }
            FieldPhase::Active => {}
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.item = None;
        self.perk = None;
        self.pointers.clear();
        self.field = EnergyField::default();
        self.initialized = false;
    }

    fn audio_cue(&self) -> AudioCue {
        AudioCue {
            energy: match self.phase {
                FieldPhase::Active => self.average / MAX_ENERGY,
                _ => 0.0,
            },
            zone: self.zone,
            perk: self.perk.map(|p| p.kind),
            silenced: self.phase == FieldPhase::GameOver,
        }
    }

    fn status_line(&self) -> String {
        let perk = match self.perk {
            Some(p) => format!(
                "  {} {:.1}s",
                p.kind.as_str(),
                p.remaining_ticks as f32 / 60.0
            ),
            None => String::new(),
        };
        format!(
            "ENERGY {:>5.1}%  {}{}  BEST {:.1}",
            self.average,
            self.zone.as_str(),
            perk,
            self.best
        )
    }

    fn retry(&mut self, events: &mut Vec<SceneEvent>) {
        self.field.zero();
        self.perk = None;
        self.item = None;
        self.reset_spawn_countdown();
        self.average = 0.0;
        self.zone = Zone::Dormant;
        self.session_peak = 0.0;
        self.last_new_record = false;
        self.phase = FieldPhase::Idle;
        log::debug!("Entropy field reset to idle");
        events.push(SceneEvent::Retry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{PointerId, PointerState};
    use crate::persistence::MemoryStore;
    use crate::settings::ArenaSettings;

    fn scene_with(scores: ScoreStore) -> EntropyFieldScene {
        let ctx = SceneContext {
            seed: 12345,
            scores,
            settings: ArenaSettings::default(),
        };
        let mut scene = EntropyFieldScene::new(&ctx);
        scene.initialize(Bounds::new(800.0, 600.0));
        scene
    }

    fn scene() -> EntropyFieldScene {
        scene_with(ScoreStore::new(MemoryStore::new().shared()))
    }

    fn held(pos: Vec2) -> InputSnapshot {
        InputSnapshot {
            pointers: vec![PointerState {
                id: PointerId::Touch(1),
                pos,
                displacement: 0.0,
            }],
            taps: vec![],
            interacted: true,
        }
    }

    fn step(scene: &mut EntropyFieldScene, input: &InputSnapshot) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        scene.step(input, &mut events).unwrap();
        events
    }

    #[test]
    fn test_idle_until_input() {
        let mut scene = scene();
        let countdown = scene.spawn_countdown();
        for _ in 0..10 {
            step(&mut scene, &InputSnapshot::default());
        }
        assert_eq!(scene.phase(), FieldPhase::Idle);
        assert_eq!(scene.spawn_countdown(), countdown);
    }

    #[test]
    fn test_empty_grid_game_over_on_first_tick() {
        let mut scene = scene();
        let events = step(
            &mut scene,
            &InputSnapshot {
                interacted: true,
                ..Default::default()
            },
        );
        assert_eq!(scene.phase(), FieldPhase::GameOver);
        assert_eq!(events.first(), Some(&SceneEvent::SessionStarted));
        assert!(matches!(events.last(), Some(SceneEvent::GameOver { .. })));
        assert!(scene.audio_cue().silenced);
    }

    #[test]
    fn test_held_pointer_keeps_session_alive() {
        let mut scene = scene();
        let input = held(Vec2::new(400.0, 300.0));
        for _ in 0..300 {
            step(&mut scene, &input);
        }
        assert_eq!(scene.phase(), FieldPhase::Active);
        assert!(scene.average() > 0.0);
        assert!(scene.session_peak() >= scene.average());

        // Release: the field drains and the session ends
        let mut ended = false;
        for _ in 0..2000 {
            let events = step(&mut scene, &InputSnapshot::default());
            if events.iter().any(|e| matches!(e, SceneEvent::GameOver { .. })) {
                ended = true;
                break;
            }
        }
        assert!(ended);
        assert_eq!(scene.phase(), FieldPhase::GameOver);
    }

    #[test]
    fn test_game_over_records_peak() {
        let scores = ScoreStore::new(MemoryStore::new().shared());
        let mut scene = scene_with(scores.clone());
        let input = held(Vec2::new(400.0, 300.0));
        for _ in 0..120 {
            step(&mut scene, &input);
        }
        let peak = scene.session_peak();
        while scene.phase() == FieldPhase::Active {
            step(&mut scene, &InputSnapshot::default());
        }
        assert!(peak > 0.0);
        assert!((scores.get() - peak as f64).abs() < 1e-4);
        assert!((scene.best() - peak as f64).abs() < 1e-4);
    }

    #[test]
    fn test_game_over_freezes_grid() {
        let mut scene = scene();
        step(
            &mut scene,
            &InputSnapshot {
                interacted: true,
                ..Default::default()
            },
        );
        assert_eq!(scene.phase(), FieldPhase::GameOver);
        let events = step(&mut scene, &held(Vec2::new(400.0, 300.0)));
        assert!(events.is_empty());
        assert_eq!(scene.average(), 0.0);
        assert_eq!(scene.field().average(), 0.0);
    }

    #[test]
    fn test_catch_at_midline_grants_full_perk() {
        let mut scene = scene();
        // Keep the session alive with a pointer sitting on the midline
        let catch_point = Vec2::new(400.0, 300.0);
        let input = held(catch_point);
        step(&mut scene, &input);
        assert!(scene.spawn_item(
            PerkKind::Freeze,
            Vec2::new(0.0, 300.0),
            Vec2::new(ITEM_SPEED, 0.0)
        ));

        let mut caught_at = None;
        for tick in 0..200 {
            let events = step(&mut scene, &input);
            if events.contains(&SceneEvent::ItemCaught(PerkKind::Freeze)) {
                caught_at = Some(tick);
                break;
            }
        }
        assert!(caught_at.is_some());
        assert!(scene.item().is_none());
        assert_eq!(
            scene.perk(),
            Some(Perk {
                kind: PerkKind::Freeze,
                remaining_ticks: PERK_TTL_TICKS
            })
        );

        // Park the pointer in a corner so later spawns drift past uncaught
        let parked = held(Vec2::new(5.0, 5.0));
        for expected in (1..PERK_TTL_TICKS).rev() {
            let events = step(&mut scene, &parked);
            assert!(!events.iter().any(|e| matches!(e, SceneEvent::ItemCaught(_))));
            match scene.perk() {
                Some(p) => assert_eq!(p.remaining_ticks, expected),
                None => panic!("perk vanished early at {}", expected),
            }
        }
        let events = step(&mut scene, &parked);
        assert!(events.contains(&SceneEvent::PerkExpired(PerkKind::Freeze)));
        assert!(scene.perk().is_none());
    }

    #[test]
    fn test_single_item_invariant() {
        let mut scene = scene();
        assert!(scene.spawn_item(PerkKind::BoostRange, Vec2::ZERO, Vec2::X));
        assert!(!scene.spawn_item(PerkKind::Freeze, Vec2::ZERO, Vec2::X));
        assert_eq!(scene.item().map(|i| i.kind), Some(PerkKind::BoostRange));
    }

    #[test]
    fn test_spawner_never_doubles_items() {
        let mut scene = scene();
        // Pointer parked in a corner: keeps the session alive but catches nothing
        let input = held(Vec2::new(5.0, 5.0));
        let mut spawned = 0;
        for _ in 0..5000 {
            let events = step(&mut scene, &input);
            spawned += events
                .iter()
                .filter(|e| matches!(e, SceneEvent::ItemSpawned(_)))
                .count();
            if scene.item().is_some() {
                assert!(scene.spawn_countdown() > 0);
            }
        }
        assert!(spawned >= 2);
    }

    #[test]
    fn test_item_trail_is_bounded() {
        let mut scene = scene();
        let input = held(Vec2::new(5.0, 5.0));
        step(&mut scene, &input);
        scene.spawn_item(
            PerkKind::BoostRange,
            Vec2::new(800.0, 400.0),
            Vec2::new(-ITEM_SPEED, 0.0),
        );
        for _ in 0..40 {
            step(&mut scene, &input);
        }
        let item = scene.item().unwrap();
        assert_eq!(item.trail.len(), ITEM_TRAIL_LENGTH);
        assert!(item.trail[0].x < item.trail[1].x);
    }

    #[test]
    fn test_item_leaving_bounds_is_removed() {
        let mut scene = scene();
        let input = held(Vec2::new(5.0, 5.0));
        step(&mut scene, &input);
        scene.spawn_item(
            PerkKind::Freeze,
            Vec2::new(790.0, 580.0),
            Vec2::new(ITEM_SPEED, 0.0),
        );
        for _ in 0..20 {
            step(&mut scene, &input);
        }
        assert!(scene.item().is_none());
        assert!(scene.perk().is_none());
    }

    #[test]
    fn test_retry_returns_to_idle() {
        let mut scene = scene();
        step(
            &mut scene,
            &InputSnapshot {
                interacted: true,
                ..Default::default()
            },
        );
        assert_eq!(scene.phase(), FieldPhase::GameOver);

        let mut events = Vec::new();
        scene.retry(&mut events);
        assert_eq!(events, vec![SceneEvent::Retry]);
        assert_eq!(scene.phase(), FieldPhase::Idle);
        assert!(scene.perk().is_none());
        assert!(scene.item().is_none());
        assert!(scene.spawn_countdown() >= SPAWN_MIN_TICKS);
        assert_eq!(scene.field().average(), 0.0);
    }

    #[test]
    fn test_retry_waits_for_fresh_input() {
        let mut scene = scene();
        step(
            &mut scene,
            &InputSnapshot {
                interacted: true,
                ..Default::default()
            },
        );
        assert_eq!(scene.phase(), FieldPhase::GameOver);
        scene.retry(&mut Vec::new());

        // Mouse still hovering the canvas, but nothing happened since
        let resting = InputSnapshot {
            pointers: vec![PointerState {
                id: PointerId::Mouse,
                pos: Vec2::new(400.0, 300.0),
                displacement: 0.0,
            }],
            taps: vec![],
            interacted: false,
        };
        for _ in 0..5 {
            assert!(step(&mut scene, &resting).is_empty());
        }
        assert_eq!(scene.phase(), FieldPhase::Idle);
        assert_eq!(scene.field().average(), 0.0);

        // Next event starts the session
        let moved = InputSnapshot {
            interacted: true,
            ..resting
        };
        let events = step(&mut scene, &moved);
        assert_eq!(events.first(), Some(&SceneEvent::SessionStarted));
        assert_eq!(scene.phase(), FieldPhase::Active);
    }

    #[test]
    fn test_resize_keeps_energy() {
        let mut scene = scene();
        let input = held(Vec2::new(400.0, 300.0));
        for _ in 0..60 {
            step(&mut scene, &input);
        }
        let before = scene.field().cells().iter().cloned().fold(0.0f32, f32::max);
        scene.resize(Bounds::new(1600.0, 1200.0));
        let after = scene.field().cells().iter().cloned().fold(0.0f32, f32::max);
        assert_eq!(before, after);
    }

    #[test]
    fn test_render_before_initialize_fails() {
        let ctx = SceneContext {
            seed: 1,
            scores: ScoreStore::new(MemoryStore::new().shared()),
            settings: ArenaSettings::default(),
        };
        let scene = EntropyFieldScene::new(&ctx);
        let mut canvas = crate::renderer::VertexCanvas::new(Bounds::default());
        assert_eq!(scene.render(&mut canvas), Err(SceneError::Uninitialized));
    }

    #[test]
    fn test_render_draws_charged_cells() {
        let mut scene = scene();
        let input = held(Vec2::new(400.0, 300.0));
        for _ in 0..30 {
            step(&mut scene, &input);
        }
        let mut canvas = crate::renderer::VertexCanvas::new(Bounds::default());
        scene.render(&mut canvas).unwrap();
        assert!(!canvas.vertices().is_empty());
    }

    #[test]
    fn test_status_line_mentions_zone() {
        let scene = scene();
        assert!(scene.status_line().contains("DORMANT"));
    }
}
