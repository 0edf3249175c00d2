//! Arena settings and preferences
//!
//! Persisted as JSON through the key-value store, separate from the score.

use serde::{Deserialize, Serialize};

use crate::persistence::SharedStore;
use crate::sim::SceneKind;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Energy field cell edge in pixels (smaller = more cells)
    pub fn cell_size(&self) -> f32 {
        match self {
            QualityPreset::Low => 48.0,
            QualityPreset::Medium => 32.0,
            QualityPreset::High => 24.0,
        }
    }

    /// Vortex debris particle count
    pub fn debris_count(&self) -> usize {
        match self {
            QualityPreset::Low => 40,
            QualityPreset::Medium => 100,
            QualityPreset::High => 160,
        }
    }

    /// Node network size
    pub fn node_count(&self) -> usize {
        match self {
            QualityPreset::Low => 48,
            QualityPreset::Medium => 80,
            QualityPreset::High => 120,
        }
    }
}

/// Arena settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Mute all audio
    pub muted: bool,
    /// Reduced motion (no pillar wobble, no discharge flashes)
    pub reduced_motion: bool,
    /// Scene shown on enter
    pub start_scene: SceneKind,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            master_volume: 0.8,
            muted: false,
            reduced_motion: false,
            start_scene: SceneKind::EntropyField,
        }
    }
}

impl ArenaSettings {
    /// Storage key
    const STORAGE_KEY: &'static str = "arena_settings";

    /// Effective output volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults on absence or parse failure
    pub fn load(store: &SharedStore) -> Self {
        let raw = store.borrow().get(Self::STORAGE_KEY);
        match raw.map(|json| serde_json::from_str::<ArenaSettings>(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings (quality {})", settings.quality.as_str());
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged, never fatal
    pub fn save(&self, store: &SharedStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = store.borrow_mut().set(Self::STORAGE_KEY, &json) {
                    log::warn!("Settings not saved: {}", e);
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Settings not serializable: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_roundtrip_through_store() {
        let store = MemoryStore::new().shared();
        let settings = ArenaSettings {
            quality: QualityPreset::High,
            muted: true,
            start_scene: SceneKind::Vortex,
            ..Default::default()
        };
        settings.save(&store);
        assert_eq!(ArenaSettings::load(&store), settings);
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        let store = MemoryStore::new().shared();
        store
            .borrow_mut()
            .set(ArenaSettings::STORAGE_KEY, "{not json")
            .unwrap();
        assert_eq!(ArenaSettings::load(&store), ArenaSettings::default());
    }

    #[test]
    fn test_partial_record_keeps_defaults() {
        let store = MemoryStore::new().shared();
        store
            .borrow_mut()
            .set(ArenaSettings::STORAGE_KEY, r#"{"muted":true}"#)
            .unwrap();
        let loaded = ArenaSettings::load(&store);
        assert!(loaded.muted);
        assert_eq!(loaded.quality, QualityPreset::Medium);
        assert_eq!(loaded.effective_volume(), 0.0);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert!(QualityPreset::High.cell_size() < QualityPreset::Low.cell_size());
    }
}
