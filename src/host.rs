//! Simulation host
//!
//! Owns the active scene, the frame loop and the lifecycle. Platform event
//! handlers call the `on_*` methods, which only touch the input tracker (and
//! arm audio inside user gestures); all simulation happens in `frame`.

use glam::Vec2;

use crate::Bounds;
use crate::audio::{AudioEngine, OneShot};
use crate::consts::{MAX_FRAME_GAP, MAX_SUBSTEPS, SIM_DT};
use crate::error::ArenaError;
use crate::highscores::ScoreStore;
use crate::input::{InputTracker, PointerId};
use crate::platform::{FrameHandle, Platform};
use crate::renderer::RenderSurface;
use crate::settings::ArenaSettings;
use crate::sim::{Scene, SceneContext, SceneEvent, SceneKind, build_scene};

/// Host lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Never entered
    Detached,
    Running,
    /// Exited; may be entered again
    Stopped,
}

pub struct SimulationHost {
    platform: Box<dyn Platform>,
    surface: Option<Box<dyn RenderSurface>>,
    on_exit: Option<Box<dyn FnOnce()>>,
    input: InputTracker,
    audio: AudioEngine,
    scores: ScoreStore,
    settings: ArenaSettings,
    scene: Option<Box<dyn Scene>>,
    scene_kind: SceneKind,
    lifecycle: Lifecycle,
    listening: bool,
    frame: Option<FrameHandle>,
    bounds: Bounds,
    /// Latest resize notification, applied at the next tick boundary
    pending_size: Option<(u32, u32)>,
    accumulator: f32,
    last_time_ms: Option<f64>,
    events: Vec<SceneEvent>,
    seed: u64,
    activations: u64,
    ticks: u64,
    frames_rendered: u64,
    faults: u32,
}

impl SimulationHost {
    pub fn new(
        platform: Box<dyn Platform>,
        audio: AudioEngine,
        scores: ScoreStore,
        settings: ArenaSettings,
        seed: u64,
    ) -> Self {
        Self {
            platform,
            surface: None,
            on_exit: None,
            input: InputTracker::new(),
            audio,
            scores,
            scene_kind: settings.start_scene,
            settings,
            scene: None,
            lifecycle: Lifecycle::Detached,
            listening: false,
            frame: None,
            bounds: Bounds::default(),
            pending_size: None,
            accumulator: 0.0,
            last_time_ms: None,
            events: Vec::new(),
            seed,
            activations: 0,
            ticks: 0,
            frames_rendered: 0,
            faults: 0,
        }
    }

    /// Take over `surface`: wire input, build the scene, start the frame loop
    pub fn enter(
        &mut self,
        mut surface: Box<dyn RenderSurface>,
        on_exit: Box<dyn FnOnce()>,
    ) -> Result<(), ArenaError> {
        if self.lifecycle == Lifecycle::Running {
            log::warn!("Arena already running; enter ignored");
            return Ok(());
        }

        if let Err(e) = self.platform.attach_listeners() {
            self.platform.detach_listeners();
            return Err(e);
        }
        self.listening = true;

        let (w, h) = surface.size();
        self.bounds = Bounds::new(w as f32, h as f32);
        // Surface and scene must agree on size from the first frame
        let clamped = (self.bounds.width as u32, self.bounds.height as u32);
        if clamped != (w, h) {
            log::warn!("Surface {}x{} below minimum, using {}x{}", w, h, clamped.0, clamped.1);
            surface.resize(clamped.0, clamped.1);
        }
        self.surface = Some(surface);
        self.on_exit = Some(on_exit);
        self.input.clear();
        self.pending_size = None;
        self.accumulator = 0.0;
        self.last_time_ms = None;

        self.activate_scene(self.scene_kind);
        self.lifecycle = Lifecycle::Running;
        self.frame = self.platform.request_frame();
        log::info!(
            "Arena entered: {} at {}x{}",
            self.scene_kind.as_str(),
            self.bounds.width,
            self.bounds.height
        );
        Ok(())
    }

    /// Stop everything; safe to call any number of times
    pub fn exit(&mut self) {
        if self.listening {
            self.platform.detach_listeners();
            self.listening = false;
        }
        if let Some(handle) = self.frame.take() {
            self.platform.cancel_frame(handle);
        }
        self.audio.shutdown();
        if let Some(mut scene) = self.scene.take() {
            scene.teardown();
        }
        self.surface = None;
        self.input.clear();
        self.events.clear();
        self.pending_size = None;

        if self.lifecycle == Lifecycle::Running {
            log::info!(
                "Arena exited after {} ticks ({} faults)",
                self.ticks,
                self.faults
            );
            self.lifecycle = Lifecycle::Stopped;
        }
    }

    /// Alias for `exit`
    pub fn stop(&mut self) {
        self.exit();
    }

    /// User asked to leave: exit, then notify the page once
    pub fn request_exit(&mut self) {
        self.exit();
        if let Some(on_exit) = self.on_exit.take() {
            on_exit();
        }
    }

    /// Forward the retry command to the active scene
    pub fn retry(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        if let Some(scene) = &mut self.scene {
            scene.retry(&mut self.events);
        }
        self.drain_events();
    }

    /// Replace the active scene with a fresh one of `kind`
    pub fn switch_scene(&mut self, kind: SceneKind) {
        self.scene_kind = kind;
        if self.lifecycle == Lifecycle::Running {
            self.activate_scene(kind);
            log::info!("Switched to {}", kind.as_str());
        }
    }

    /// Install a custom scene in the slot (tears the previous one down)
    pub fn install_scene(&mut self, mut scene: Box<dyn Scene>) {
        if let Some(mut old) = self.scene.take() {
            old.teardown();
        }
        scene.initialize(self.bounds);
        self.scene_kind = scene.kind();
        self.scene = Some(scene);
    }

    fn activate_scene(&mut self, kind: SceneKind) {
        self.activations += 1;
        let ctx = SceneContext {
            seed: self
                .seed
                .wrapping_add(self.activations.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            scores: self.scores.clone(),
            settings: self.settings.clone(),
        };
        self.install_scene(build_scene(kind, &ctx));
        log::debug!("Scene {} activated", kind.as_str());
    }

    // === Event entry points (input tracker only) ===

    pub fn on_pointer_down(&mut self, id: PointerId, pos: Vec2) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        self.input.begin(id, pos);
        self.audio.arm();
    }

    pub fn on_pointer_move(&mut self, id: PointerId, pos: Vec2) {
        if self.lifecycle == Lifecycle::Running {
            self.input.move_to(id, pos);
        }
    }

    pub fn on_pointer_up(&mut self, id: PointerId) {
        if self.lifecycle == Lifecycle::Running {
            self.input.end(id);
        }
    }

    pub fn on_pointer_cancel(&mut self, id: PointerId) {
        if self.lifecycle == Lifecycle::Running {
            self.input.cancel(id);
        }
    }

    /// Click or tap
    pub fn on_tap(&mut self, pos: Vec2) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        self.input.tap(pos);
        self.audio.arm();
    }

    /// Cache the new size; geometry follows at the next tick boundary
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.pending_size = Some((width, height));
    }

    // === Frame loop ===

    /// Frame callback: run fixed ticks for the elapsed time, render once
    pub fn frame(&mut self, now_ms: f64) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        // The request that led here has fired
        self.frame = None;

        let dt = match self.last_time_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_GAP),
            None => SIM_DT,
        };
        self.last_time_ms = Some(now_ms);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop time we could not catch up on
        self.accumulator = self.accumulator.min(SIM_DT);

        self.render();

        if self.lifecycle == Lifecycle::Running {
            self.frame = self.platform.request_frame();
        }
    }

    /// Advance one fixed tick (normally driven by `frame`)
    pub fn tick(&mut self) {
        self.apply_pending_resize();
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let snapshot = self.input.snapshot();
        if let Err(e) = scene.step(&snapshot, &mut self.events) {
            self.faults += 1;
            log::error!("{} step failed: {}", scene.kind().as_str(), e);
        }
        let cue = scene.audio_cue();
        self.audio.update(&cue);
        self.ticks += 1;
        self.drain_events();
    }

    fn apply_pending_resize(&mut self) {
        let Some((w, h)) = self.pending_size.take() else {
            return;
        };
        let bounds = Bounds::new(w as f32, h as f32);
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        if let Some(surface) = &mut self.surface {
            surface.resize(bounds.width as u32, bounds.height as u32);
        }
        if let Some(scene) = &mut self.scene {
            scene.resize(bounds);
        }
        log::debug!("Resized to {}x{}", bounds.width, bounds.height);
    }

    fn render(&mut self) {
        let (Some(surface), Some(scene)) = (self.surface.as_mut(), self.scene.as_ref()) else {
            return;
        };
        let canvas = surface.begin_frame(self.bounds);
        if let Err(e) = scene.render(canvas) {
            self.faults += 1;
            log::error!("{} render failed: {}", scene.kind().as_str(), e);
        }
        match surface.present() {
            Ok(()) => self.frames_rendered += 1,
            Err(e) => {
                self.faults += 1;
                log::warn!("Present failed: {}", e);
            }
        }
    }

    fn drain_events(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        for event in events.drain(..) {
            self.handle_event(event);
        }
        // Keep the allocation
        self.events = events;
    }

    fn handle_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::SessionStarted | SceneEvent::Retry => self.audio.play(OneShot::Click),
            SceneEvent::ItemCaught(_) => self.audio.play(OneShot::Pickup),
            SceneEvent::PulseBroadcast => self.audio.play(OneShot::PulseBroadcast),
            SceneEvent::Boost => self.audio.play(OneShot::Boost),
            SceneEvent::GameOver { peak, new_record } => {
                self.audio.silence();
                if new_record {
                    log::info!("New all-time high: {:.1}", peak);
                    self.audio.play(OneShot::NewRecord);
                } else {
                    self.audio.play(OneShot::GameOver);
                }
            }
            SceneEvent::ItemSpawned(_) | SceneEvent::PerkExpired(_) => {}
        }
    }

    // === Accessors ===

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn frame_pending(&self) -> bool {
        self.frame.is_some()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn scene(&self) -> Option<&dyn Scene> {
        self.scene.as_deref()
    }

    pub fn scene_kind(&self) -> SceneKind {
        self.scene_kind
    }

    pub fn audio(&self) -> &AudioEngine {
        &self.audio
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    /// Change master volume; the caller decides whether to persist settings
    pub fn set_volume(&mut self, volume: f32) {
        self.settings.master_volume = volume.clamp(0.0, 1.0);
        self.audio.set_volume(self.settings.effective_volume());
    }

    /// Flip mute and return the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.settings.muted = !self.settings.muted;
        self.audio.set_volume(self.settings.effective_volume());
        log::info!("Audio {}", if self.settings.muted { "muted" } else { "unmuted" });
        self.settings.muted
    }

    pub fn status_line(&self) -> Option<String> {
        self.scene.as_ref().map(|s| s.status_line())
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::testing::recording_engine;
    use crate::error::SceneError;
    use crate::input::InputSnapshot;
    use crate::persistence::MemoryStore;
    use crate::platform::HeadlessPlatform;
    use crate::renderer::{Canvas, HeadlessSurface};
    use crate::sim::AudioCue;

    fn host() -> (SimulationHost, HeadlessPlatform) {
        let platform = HeadlessPlatform::new();
        let (audio, _log) = recording_engine();
        let host = SimulationHost::new(
            Box::new(platform.clone()),
            audio,
            ScoreStore::new(MemoryStore::new().shared()),
            ArenaSettings::default(),
            42,
        );
        (host, platform)
    }

    fn enter(host: &mut SimulationHost) -> Rc<Cell<u32>> {
        let exits = Rc::new(Cell::new(0));
        let counter = exits.clone();
        host.enter(
            Box::new(HeadlessSurface::new(800, 600)),
            Box::new(move || counter.set(counter.get() + 1)),
        )
        .unwrap();
        exits
    }

    #[test]
    fn test_enter_wires_everything() {
        let (mut host, platform) = host();
        enter(&mut host);
        assert!(host.is_running());
        assert!(platform.listeners_attached());
        assert!(platform.frame_pending());
        assert!(host.frame_pending());
        assert_eq!(host.scene().map(|s| s.kind()), Some(SceneKind::EntropyField));
    }

    #[test]
    fn test_exit_twice_is_clean() {
        let (mut host, platform) = host();
        let exits = enter(&mut host);
        host.on_pointer_down(PointerId::Mouse, Vec2::new(10.0, 10.0));
        assert!(host.audio().is_active());

        host.exit();
        host.exit();

        assert_eq!(host.lifecycle(), Lifecycle::Stopped);
        assert!(!host.frame_pending());
        assert!(!platform.frame_pending());
        assert!(!platform.listeners_attached());
        assert_eq!(platform.state().detach_calls, 1);
        assert!(!host.audio().is_active());
        assert!(host.scene().is_none());
        assert!(host.input().is_empty());
        // exit() alone never notifies the page
        assert_eq!(exits.get(), 0);
    }

    #[test]
    fn test_request_exit_notifies_once() {
        let (mut host, _platform) = host();
        let exits = enter(&mut host);
        host.request_exit();
        host.request_exit();
        assert_eq!(exits.get(), 1);
        assert!(!host.frame_pending());
    }

    #[test]
    fn test_frame_loop_ticks_and_renders() {
        let (mut host, platform) = host();
        enter(&mut host);
        let mut now = 0.0;
        for _ in 0..30 {
            assert!(platform.take_frame().is_some());
            host.frame(now);
            now += 20.0;
        }
        assert!(host.ticks() >= 30);
        assert_eq!(host.frames_rendered(), 30);
        assert!(platform.frame_pending());
    }

    #[test]
    fn test_long_stall_is_capped() {
        let (mut host, _platform) = host();
        enter(&mut host);
        host.frame(0.0);
        let before = host.ticks();
        host.frame(10_000.0);
        assert!(host.ticks() - before <= MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_frame_after_exit_does_nothing() {
        let (mut host, platform) = host();
        enter(&mut host);
        host.exit();
        host.frame(16.0);
        assert_eq!(host.ticks(), 0);
        assert!(!platform.frame_pending());
    }

    #[test]
    fn test_resize_waits_for_tick_boundary() {
        let (mut host, _platform) = host();
        enter(&mut host);
        host.on_resize(1024, 768);
        assert_eq!(host.bounds(), Bounds::new(800.0, 600.0));
        host.tick();
        assert_eq!(host.bounds(), Bounds::new(1024.0, 768.0));

        host.on_resize(0, 0);
        host.tick();
        assert_eq!(host.bounds(), Bounds::new(64.0, 64.0));
    }

    #[test]
    fn test_events_ignored_when_not_running() {
        let (mut host, _platform) = host();
        host.on_pointer_down(PointerId::Touch(1), Vec2::ZERO);
        host.on_tap(Vec2::ZERO);
        assert!(host.input().is_empty());
        assert!(!host.audio().is_active());
    }

    #[test]
    fn test_switch_scene_replaces_slot() {
        let (mut host, _platform) = host();
        enter(&mut host);
        host.switch_scene(SceneKind::Vortex);
        assert_eq!(host.scene().map(|s| s.kind()), Some(SceneKind::Vortex));
        host.tick();
        assert!(host.status_line().unwrap_or_default().contains('$'));
    }

    #[test]
    fn test_game_over_plays_and_silences() {
        let platform = HeadlessPlatform::new();
        let (audio, log) = recording_engine();
        let mut host = SimulationHost::new(
            Box::new(platform),
            audio,
            ScoreStore::new(MemoryStore::new().shared()),
            ArenaSettings::default(),
            1,
        );
        enter(&mut host);
        host.on_pointer_down(PointerId::Touch(1), Vec2::new(400.0, 300.0));
        host.on_pointer_up(PointerId::Touch(1));
        host.tick();

        let log = log.borrow();
        assert!(log.shots.contains(&OneShot::Click));
        assert!(log.shots.contains(&OneShot::GameOver));
        let last_gain = log
            .glides
            .iter()
            .rev()
            .find(|(p, _)| *p == crate::audio::DroneParam::MasterGain)
            .map(|(_, v)| *v);
        assert_eq!(last_gain, Some(0.0));
    }

    struct FaultyScene;

    impl Scene for FaultyScene {
        fn kind(&self) -> SceneKind {
            SceneKind::NodeNetwork
        }
        fn initialize(&mut self, _bounds: Bounds) {}
        fn resize(&mut self, _bounds: Bounds) {}
        fn step(
            &mut self,
            _input: &InputSnapshot,
            _events: &mut Vec<SceneEvent>,
        ) -> Result<(), SceneError> {
            Err(SceneError::NonFinite { what: "test" })
        }
        fn render(&self, _canvas: &mut dyn Canvas) -> Result<(), SceneError> {
            Err(SceneError::Uninitialized)
        }
        fn teardown(&mut self) {}
        fn audio_cue(&self) -> AudioCue {
            AudioCue::default()
        }
        fn status_line(&self) -> String {
            String::new()
        }
    }

    #[test]
    fn test_scene_faults_are_contained() {
        let (mut host, platform) = host();
        enter(&mut host);
        host.install_scene(Box::new(FaultyScene));
        host.frame(0.0);
        host.frame(20.0);
        assert!(host.faults() >= 3);
        assert!(host.is_running());
        host.exit();
        assert!(!platform.frame_pending());
    }

    /// Surface whose size stays observable after the host takes it
    struct SharedSizeSurface {
        size: Rc<Cell<(u32, u32)>>,
        canvas: crate::renderer::VertexCanvas,
    }

    impl RenderSurface for SharedSizeSurface {
        fn size(&self) -> (u32, u32) {
            self.size.get()
        }
        fn resize(&mut self, width: u32, height: u32) {
            self.size.set((width, height));
        }
        fn begin_frame(&mut self, bounds: Bounds) -> &mut dyn Canvas {
            self.canvas.reset(bounds);
            &mut self.canvas
        }
        fn present(&mut self) -> Result<(), crate::error::RenderError> {
            Ok(())
        }
    }

    #[test]
    fn test_enter_clamps_tiny_surface() {
        let (mut host, _platform) = host();
        // A canvas measured while hidden reports a 1x1 backing store
        let size = Rc::new(Cell::new((1, 1)));
        host.enter(
            Box::new(SharedSizeSurface {
                size: size.clone(),
                canvas: Default::default(),
            }),
            Box::new(|| {}),
        )
        .unwrap();
        let bounds = host.bounds();
        assert_eq!(bounds, Bounds::new(64.0, 64.0));
        assert_eq!(size.get(), (64, 64));

        // Later resizes still reach the surface at the tick boundary
        host.on_resize(1024, 768);
        assert_eq!(size.get(), (64, 64));
        host.tick();
        assert_eq!(size.get(), (1024, 768));
    }

    #[test]
    fn test_mute_and_volume_follow_settings() {
        let (mut host, _platform) = host();
        enter(&mut host);
        host.set_volume(0.5);
        assert_eq!(host.audio().volume(), 0.5);

        assert!(host.toggle_mute());
        assert!(host.settings().muted);
        assert_eq!(host.audio().volume(), 0.0);

        // Volume changes while muted are remembered, not applied
        host.set_volume(2.0);
        assert_eq!(host.settings().master_volume, 1.0);
        assert_eq!(host.audio().volume(), 0.0);

        assert!(!host.toggle_mute());
        assert_eq!(host.audio().volume(), 1.0);
    }

    #[test]
    fn test_reenter_after_exit() {
        let (mut host, platform) = host();
        enter(&mut host);
        host.exit();
        enter(&mut host);
        assert!(host.is_running());
        assert!(platform.listeners_attached());
        assert!(host.scene().is_some());
    }
}
