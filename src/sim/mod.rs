//! Arena scenes
//!
//! Every scene is pure simulation over an input snapshot:
//! - Fixed timestep only (one `step` per tick)
//! - Seeded RNG only
//! - No platform dependencies; drawing goes through `Canvas`

pub mod entropy;
pub mod field;
pub mod network;
pub mod projection;
pub mod vortex;

pub use entropy::{ActiveItem, EntropyFieldScene, FieldPhase, Perk, PerkKind};
pub use field::{EnergyField, FieldPhysics};
pub use network::{Edge, Node3D, NodeNetworkScene, Pulse};
pub use vortex::VortexScene;

use serde::{Deserialize, Serialize};

use crate::Bounds;
use crate::error::SceneError;
use crate::highscores::ScoreStore;
use crate::input::InputSnapshot;
use crate::renderer::Canvas;
use crate::settings::ArenaSettings;

/// Which scene occupies the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SceneKind {
    #[default]
    EntropyField,
    NodeNetwork,
    Vortex,
}

impl SceneKind {
    pub const ALL: [SceneKind; 3] = [
        SceneKind::EntropyField,
        SceneKind::NodeNetwork,
        SceneKind::Vortex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneKind::EntropyField => "entropy-field",
            SceneKind::NodeNetwork => "node-network",
            SceneKind::Vortex => "vortex",
        }
    }

    /// Cycle order used by the scene switch key
    pub fn next(self) -> Self {
        match self {
            SceneKind::EntropyField => SceneKind::NodeNetwork,
            SceneKind::NodeNetwork => SceneKind::Vortex,
            SceneKind::Vortex => SceneKind::EntropyField,
        }
    }
}

/// Display/audio theme derived from average energy (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Zone {
    #[default]
    Dormant,
    Warm,
    Charged,
    Surge,
    Peak,
}

impl Zone {
    /// Classify an average energy level; thresholds are theming, not rules
    pub fn classify(average: f32) -> Self {
        if average >= 90.0 {
            Zone::Peak
        } else if average >= 65.0 {
            Zone::Surge
        } else if average >= 50.0 {
            Zone::Charged
        } else if average >= 30.0 {
            Zone::Warm
        } else {
            Zone::Dormant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Dormant => "DORMANT",
            Zone::Warm => "WARM",
            Zone::Charged => "CHARGED",
            Zone::Surge => "SURGE",
            Zone::Peak => "PEAK",
        }
    }

    /// Base color for cells and HUD accents
    pub fn color(&self) -> [f32; 4] {
        use crate::renderer::colors;
        match self {
            Zone::Dormant => colors::ACCENT_DEEP,
            Zone::Warm => colors::ACCENT,
            Zone::Charged => [1.0, 0.85, 0.0, 1.0],
            Zone::Surge => colors::SECONDARY,
            Zone::Peak => colors::WHITE,
        }
    }
}

/// What the audio engine needs from the active scene each tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioCue {
    /// Normalized energy, 0..1
    pub energy: f32,
    pub zone: Zone,
    pub perk: Option<PerkKind>,
    /// Continuous voices must be silent (e.g. game over)
    pub silenced: bool,
}

/// Things that happened during a step, for audio and logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    SessionStarted,
    ItemSpawned(PerkKind),
    ItemCaught(PerkKind),
    PerkExpired(PerkKind),
    GameOver { peak: f32, new_record: bool },
    Retry,
    PulseBroadcast,
    Boost,
}

/// Everything a scene may need at construction
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub seed: u64,
    pub scores: ScoreStore,
    pub settings: ArenaSettings,
}

/// A pluggable simulation/visualization mode
pub trait Scene {
    fn kind(&self) -> SceneKind;

    /// Build geometry for the given surface size
    fn initialize(&mut self, bounds: Bounds);

    /// Surface size changed; called by the host at a tick boundary
    fn resize(&mut self, bounds: Bounds);

    /// Advance one fixed tick
    fn step(&mut self, input: &InputSnapshot, events: &mut Vec<SceneEvent>)
    -> Result<(), SceneError>;

    /// Draw the current state
    fn render(&self, canvas: &mut dyn Canvas) -> Result<(), SceneError>;

    /// Release everything the scene holds
    fn teardown(&mut self);

    fn audio_cue(&self) -> AudioCue;

    /// One-line HUD text
    fn status_line(&self) -> String;

    /// Explicit retry command; scenes without a failure state ignore it
    fn retry(&mut self, _events: &mut Vec<SceneEvent>) {}
}

/// Construct a scene of the given kind (call `initialize` before stepping)
pub fn build_scene(kind: SceneKind, ctx: &SceneContext) -> Box<dyn Scene> {
    match kind {
        SceneKind::EntropyField => Box::new(EntropyFieldScene::new(ctx)),
        SceneKind::NodeNetwork => Box::new(NodeNetworkScene::new(ctx)),
        SceneKind::Vortex => Box::new(VortexScene::new(ctx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_thresholds() {
        assert_eq!(Zone::classify(0.0), Zone::Dormant);
        assert_eq!(Zone::classify(29.9), Zone::Dormant);
        assert_eq!(Zone::classify(30.0), Zone::Warm);
        assert_eq!(Zone::classify(50.0), Zone::Charged);
        assert_eq!(Zone::classify(65.0), Zone::Surge);
        assert_eq!(Zone::classify(90.0), Zone::Peak);
        assert_eq!(Zone::classify(100.0), Zone::Peak);
        assert!(Zone::Peak > Zone::Surge);
    }

    #[test]
    fn test_scene_kind_cycles() {
        let mut kind = SceneKind::EntropyField;
        for _ in 0..3 {
            kind = kind.next();
        }
        assert_eq!(kind, SceneKind::EntropyField);
    }

    #[test]
    fn test_build_scene_matches_kind() {
        use crate::persistence::MemoryStore;
        let ctx = SceneContext {
            seed: 7,
            scores: ScoreStore::new(MemoryStore::new().shared()),
            settings: ArenaSettings::default(),
        };
        for kind in SceneKind::ALL {
            assert_eq!(build_scene(kind, &ctx).kind(), kind);
        }
    }
}
