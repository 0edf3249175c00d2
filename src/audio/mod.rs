//! Procedural audio feedback
//!
//! A continuous drone (tone + filtered noise) whose parameters glide toward
//! targets derived from the active scene every tick, plus fire-and-forget
//! one-shots. Synthesis goes through an `AudioSink`; the browser sink uses
//! Web Audio, tests use a recording sink.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::error::AudioError;
use crate::sim::{AudioCue, PerkKind, Zone};

/// Time constant for parameter glides, in seconds
pub const GLIDE_TIME_CONSTANT: f32 = 0.08;
/// Below this normalized energy the drone is silent
pub const MIN_AUDIBLE_ENERGY: f32 = 0.02;
/// Drone pitch at zero energy (Hz)
pub const BASE_FREQUENCY: f32 = 55.0;
/// Pitch added at full energy (Hz)
pub const FREQUENCY_SPAN: f32 = 330.0;
pub const BASE_CUTOFF: f32 = 300.0;
pub const CUTOFF_SPAN: f32 = 3500.0;
const MAX_CUTOFF: f32 = 12_000.0;

/// Short procedural effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShot {
    /// Item caught
    Pickup,
    /// Pulse ring launched
    PulseBroadcast,
    /// Generic interaction
    Click,
    /// Vortex thrust boost
    Boost,
    GameOver,
    NewRecord,
}

/// Continuous drone parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroneParam {
    ToneFrequency,
    NoiseCutoff,
    MasterGain,
}

/// Synthesis backend
pub trait AudioSink {
    /// Resume a suspended context (must run inside a user gesture)
    fn resume(&mut self);
    fn start_drone(&mut self) -> Result<(), AudioError>;
    fn drone_active(&self) -> bool;
    /// Exponential approach of `param` toward `target`
    fn glide(&mut self, param: DroneParam, target: f32, time_constant: f32);
    fn stop_drone(&mut self);
    fn play(&mut self, shot: OneShot, volume: f32);
    /// Release the backend; the sink is unusable afterwards
    fn close(&mut self);
}

/// Builds a sink on first user interaction
pub type SinkFactory = Box<dyn FnMut() -> Result<Box<dyn AudioSink>, AudioError>>;

/// Where the drone parameters should be heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroneTargets {
    pub frequency: f32,
    pub cutoff: f32,
    pub gain: f32,
}

impl Zone {
    /// Pitch multiplier for the drone
    fn pitch_ratio(&self) -> f32 {
        match self {
            Zone::Dormant | Zone::Warm => 1.0,
            Zone::Charged => 1.122,
            Zone::Surge => 1.26,
            Zone::Peak => 1.5,
        }
    }
}

/// Map a scene cue to drone targets at the given master volume
pub fn drone_targets(cue: &AudioCue, volume: f32) -> DroneTargets {
    let energy = if cue.energy.is_finite() {
        cue.energy.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut frequency = (BASE_FREQUENCY + energy * FREQUENCY_SPAN) * cue.zone.pitch_ratio();
    let mut cutoff = BASE_CUTOFF + energy * CUTOFF_SPAN;
    match cue.perk {
        Some(PerkKind::Freeze) => {
            frequency *= 0.5;
            cutoff *= 0.3;
        }
        Some(PerkKind::BoostRange) => {
            frequency *= 1.2;
            cutoff *= 1.5;
        }
        None => {}
    }
    let gain = if cue.silenced || energy < MIN_AUDIBLE_ENERGY {
        0.0
    } else {
        (0.04 + energy * 0.16) * volume.clamp(0.0, 1.0)
    };
    DroneTargets {
        frequency,
        cutoff: cutoff.min(MAX_CUTOFF),
        gain,
    }
}

/// Owns the sink and keeps the drone in step with the scene
pub struct AudioEngine {
    factory: SinkFactory,
    sink: Option<Box<dyn AudioSink>>,
    /// Sink creation failed; stay silent for the session
    disabled: bool,
    volume: f32,
    last_targets: Option<DroneTargets>,
}

impl AudioEngine {
    pub fn new(factory: SinkFactory, volume: f32) -> Self {
        Self {
            factory,
            sink: None,
            disabled: false,
            volume: volume.clamp(0.0, 1.0),
            last_targets: None,
        }
    }

    /// Engine that never makes a sound
    pub fn silent() -> Self {
        Self::new(Box::new(|| Err(AudioError::Unsupported)), 0.0)
    }

    /// Create the sink and start the drone; call from a user-gesture handler
    pub fn arm(&mut self) {
        if self.disabled {
            return;
        }
        if self.sink.is_none() {
            match (self.factory)() {
                Ok(sink) => {
                    log::info!("Audio engine armed");
                    self.sink = Some(sink);
                }
                Err(e) => {
                    log::warn!("Audio unavailable, continuing without sound: {}", e);
                    self.disabled = true;
                    return;
                }
            }
        }
        if let Some(sink) = &mut self.sink {
            sink.resume();
            if !sink.drone_active() {
                if let Err(e) = sink.start_drone() {
                    log::warn!("Drone failed to start: {}", e);
                }
                self.last_targets = None;
            }
        }
    }

    /// Glide the drone toward the cue's targets
    pub fn update(&mut self, cue: &AudioCue) {
        let Some(sink) = &mut self.sink else {
            return;
        };
        if !sink.drone_active() {
            return;
        }
        let targets = drone_targets(cue, self.volume);
        // Unchanged targets would only stack duplicate automation events
        if self.last_targets == Some(targets) {
            return;
        }
        sink.glide(DroneParam::ToneFrequency, targets.frequency, GLIDE_TIME_CONSTANT);
        sink.glide(DroneParam::NoiseCutoff, targets.cutoff, GLIDE_TIME_CONSTANT);
        sink.glide(DroneParam::MasterGain, targets.gain, GLIDE_TIME_CONSTANT);
        self.last_targets = Some(targets);
    }

    pub fn play(&mut self, shot: OneShot) {
        if self.volume <= 0.0 {
            return;
        }
        if let Some(sink) = &mut self.sink {
            sink.play(shot, self.volume);
        }
    }

    /// Fade the drone out without releasing anything
    pub fn silence(&mut self) {
        if let Some(sink) = &mut self.sink {
            sink.glide(DroneParam::MasterGain, 0.0, GLIDE_TIME_CONSTANT);
        }
        self.last_targets = None;
    }

    /// Stop everything and release the sink; safe to call repeatedly
    pub fn shutdown(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            sink.stop_drone();
            sink.close();
            log::info!("Audio engine shut down");
        }
        self.last_targets = None;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[cfg(test)]
    pub(crate) fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// A continuous generator is currently running
    pub fn is_active(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.drone_active())
    }

    #[cfg(test)]
    pub(crate) fn last_targets(&self) -> Option<DroneTargets> {
        self.last_targets
    }
}


#[cfg(test)]
mod tests {
    use super::testing::recording_engine;
    use super::*;

    fn cue(energy: f32) -> AudioCue {
        AudioCue {
            energy,
            zone: Zone::classify(energy * 100.0),
            perk: None,
            silenced: false,
        }
    }

    #[test]
    fn test_gain_zero_below_threshold() {
        assert_eq!(drone_targets(&cue(0.0), 1.0).gain, 0.0);
        assert_eq!(drone_targets(&cue(0.01), 1.0).gain, 0.0);
        assert!(drone_targets(&cue(0.5), 1.0).gain > 0.0);
        assert_eq!(drone_targets(&cue(0.5), 0.0).gain, 0.0);
    }

    #[test]
    fn test_silenced_cue_mutes() {
        let mut c = cue(0.9);
        c.silenced = true;
        assert_eq!(drone_targets(&c, 1.0).gain, 0.0);
    }

    #[test]
    fn test_targets_rise_with_energy() {
        let low = drone_targets(&cue(0.1), 1.0);
        let high = drone_targets(&cue(0.95), 1.0);
        assert!(high.frequency > low.frequency);
        assert!(high.cutoff > low.cutoff);
        assert!(high.gain > low.gain);
    }

    #[test]
    fn test_perks_shape_drone() {
        let plain = drone_targets(&cue(0.5), 1.0);
        let mut frozen = cue(0.5);
        frozen.perk = Some(PerkKind::Freeze);
        let mut boosted = cue(0.5);
        boosted.perk = Some(PerkKind::BoostRange);
        assert!(drone_targets(&frozen, 1.0).frequency < plain.frequency);
        assert!(drone_targets(&boosted, 1.0).cutoff > plain.cutoff);
    }

    #[test]
    fn test_non_finite_energy_is_silent() {
        assert_eq!(drone_targets(&cue(f32::NAN), 1.0).gain, 0.0);
    }

    #[test]
    fn test_sink_created_lazily_once() {
        let (mut engine, log) = recording_engine();
        engine.update(&cue(0.5));
        engine.play(OneShot::Click);
        assert_eq!(log.borrow().created, 0);
        assert!(!engine.is_active());

        engine.arm();
        engine.arm();
        assert_eq!(log.borrow().created, 1);
        assert_eq!(log.borrow().drone_starts, 1);
        assert!(engine.is_active());

        engine.update(&cue(0.5));
        assert_eq!(log.borrow().glides.len(), 3);
        engine.play(OneShot::Pickup);
        assert_eq!(log.borrow().shots, vec![OneShot::Pickup]);
    }

    #[test]
    fn test_unchanged_targets_glide_once() {
        let (mut engine, log) = recording_engine();
        engine.arm();
        engine.update(&cue(0.5));
        engine.update(&cue(0.5));
        assert_eq!(log.borrow().glides.len(), 3);
        assert_eq!(engine.last_targets(), Some(drone_targets(&cue(0.5), 0.8)));

        engine.update(&cue(0.6));
        assert_eq!(log.borrow().glides.len(), 6);

        // After a fade-out the same targets must be sent again
        engine.silence();
        engine.update(&cue(0.6));
        assert_eq!(log.borrow().glides.len(), 10);
        assert_eq!(log.borrow().glides.last().map(|g| g.0), Some(DroneParam::MasterGain));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (mut engine, log) = recording_engine();
        engine.arm();
        engine.shutdown();
        engine.shutdown();
        assert!(!engine.is_active());
        assert_eq!(log.borrow().closed, 1);
        assert!(!log.borrow().drone_active);
        assert!(engine.last_targets().is_none());
    }

    #[test]
    fn test_failed_factory_disables_audio() {
        let mut calls = 0;
        let factory: SinkFactory = Box::new(move || {
            calls += 1;
            assert_eq!(calls, 1, "factory retried after failure");
            Err(AudioError::Create("no context".into()))
        });
        let mut engine = AudioEngine::new(factory, 1.0);
        engine.arm();
        engine.arm();
        assert!(engine.is_disabled());
        assert!(!engine.is_active());
        engine.update(&cue(0.7));
        engine.shutdown();
    }
}
