//! Board settings and tuning
//!
//! Persisted separately from the idea snapshot in the key-value store.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::KeyValueStore;

/// Physics and sizing parameters for the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    // === Motion ===
    /// Position units advanced per velocity unit per millisecond
    pub velocity_scale: f32,
    /// Longest frame the integrator will accept (ms)
    pub max_frame_ms: f32,
    /// Velocity kept after a wall bounce (1.0 = perfectly elastic)
    pub restitution: f32,

    // === Flow mode ===
    /// Minimum launch speed
    pub base_speed: f32,
    /// Random extra speed added on top of `base_speed`
    pub speed_spread: f32,

    // === Piano mode ===
    pub piano_speed_min: f32,
    pub piano_speed_max: f32,

    // === Interaction ===
    /// Velocity kept by both ideas after a collision swap
    pub collision_damping: f32,
    /// Pointer delta to throw velocity factor
    pub throw_damping: f32,

    // === Resize ===
    pub font_min: f32,
    pub font_max: f32,
    pub font_step: f32,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            velocity_scale: 0.01,
            max_frame_ms: 250.0,
            restitution: 1.0,

            base_speed: 2.0,
            speed_spread: 1.0,

            piano_speed_min: 2.0,
            piano_speed_max: 4.0,

            collision_damping: 0.9,
            throw_damping: 0.5,

            font_min: 10.0,
            font_max: 48.0,
            font_step: 2.0,
        }
    }
}

impl BoardSettings {
    /// Clamp out-of-range values coming from hand-edited storage
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.velocity_scale.is_finite() || self.velocity_scale <= 0.0 {
            self.velocity_scale = defaults.velocity_scale;
        }
        if !self.max_frame_ms.is_finite() || self.max_frame_ms <= 0.0 {
            self.max_frame_ms = defaults.max_frame_ms;
        }
        self.base_speed = finite_or(self.base_speed, defaults.base_speed);
        self.speed_spread = finite_or(self.speed_spread, defaults.speed_spread);
        self.piano_speed_min = finite_or(self.piano_speed_min, defaults.piano_speed_min);
        self.piano_speed_max = finite_or(self.piano_speed_max, defaults.piano_speed_max);
        self.throw_damping = finite_or(self.throw_damping, defaults.throw_damping);
        self.font_min = finite_or(self.font_min, defaults.font_min);
        self.font_max = finite_or(self.font_max, defaults.font_max);
        self.font_step = finite_or(self.font_step, defaults.font_step);
        self.restitution = finite_or(self.restitution, defaults.restitution).clamp(0.0, 1.0);
        self.collision_damping =
            finite_or(self.collision_damping, defaults.collision_damping).clamp(0.0, 1.0);
        if self.piano_speed_max < self.piano_speed_min {
            std::mem::swap(&mut self.piano_speed_min, &mut self.piano_speed_max);
        }
        if self.font_max < self.font_min {
            std::mem::swap(&mut self.font_min, &mut self.font_max);
        }
        self.font_step = self.font_step.abs();
        self
    }

    /// Load settings from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Self>(&json) {
                Ok(settings) => {
                    log::info!("Loaded board settings");
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = store.set(SETTINGS_KEY, &json) {
                    log::warn!("Could not save settings: {}", e);
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Could not encode settings: {}", e),
        }
    }
}

fn finite_or(value: f32, default: f32) -> f32 {
    if value.is_finite() { value } else { default }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_load_defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(BoardSettings::load(&store), BoardSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = BoardSettings {
            restitution: 0.8,
            font_step: 4.0,
            ..Default::default()
        };
        settings.save(&mut store);
        assert_eq!(BoardSettings::load(&store), settings);
    }

    #[test]
    fn test_partial_and_malformed_settings() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, r#"{"base_speed": 5.0}"#).unwrap();
        let loaded = BoardSettings::load(&store);
        assert_eq!(loaded.base_speed, 5.0);
        assert_eq!(loaded.max_frame_ms, 250.0);

        store.set(SETTINGS_KEY, "not json").unwrap();
        assert_eq!(BoardSettings::load(&store), BoardSettings::default());
    }

    #[test]
    fn test_sanitize_swaps_inverted_ranges() {
        let settings = BoardSettings {
            piano_speed_min: 5.0,
            piano_speed_max: 1.0,
            restitution: 3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.piano_speed_min, 1.0);
        assert_eq!(settings.piano_speed_max, 5.0);
        assert_eq!(settings.restitution, 1.0);
    }

    #[test]
    fn test_sanitize_replaces_non_finite_values() {
        let settings = BoardSettings {
            base_speed: f32::NAN,
            speed_spread: f32::INFINITY,
            piano_speed_min: f32::NAN,
            piano_speed_max: f32::NAN,
            restitution: f32::NAN,
            collision_damping: f32::NEG_INFINITY,
            font_step: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings, BoardSettings::default());

        // Usable by the velocity policy without panicking
        let mut rng = rand_pcg::Pcg32::new(7, 0);
        let vel = crate::sim::mode::piano_velocity(&settings, &mut rng);
        assert!(vel.x <= -2.0 && vel.x >= -4.0);
    }
}
