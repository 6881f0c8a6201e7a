//! Game balance and preferences
//!
//! `Tuning` holds every balance constant the simulation reads. `Settings`
//! wraps it with display preferences and is persisted in LocalStorage.

use serde::{Deserialize, Serialize};

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Player horizontal speed (px/s)
    pub player_speed: f32,
    /// Player collision radius (px)
    pub player_radius: f32,

    /// Obstacle fall speed at t = 0 (px/s)
    pub obstacle_base_speed: f32,
    /// Fall speed added per second survived (px/s²)
    pub obstacle_speed_ramp: f32,
    /// Fall speed cap (px/s)
    pub obstacle_max_speed: f32,
    /// Drawn obstacle size (px); collision radii scale with it
    pub obstacle_size: f32,

    /// Seconds between spawns at t = 0
    pub spawn_interval_initial: f32,
    /// Seconds removed from the spawn interval per second survived
    pub spawn_interval_decay: f32,
    /// Spawn interval floor (seconds)
    pub spawn_interval_min: f32,

    /// Points awarded per second survived
    pub score_per_second: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 380.0,
            player_radius: 24.0,

            obstacle_base_speed: 180.0,
            obstacle_speed_ramp: 6.0,
            obstacle_max_speed: 520.0,
            obstacle_size: crate::consts::OBSTACLE_BASE_SIZE,

            spawn_interval_initial: 1.2,
            spawn_interval_decay: 0.02,
            spawn_interval_min: 0.35,

            score_per_second: 10.0,
        }
    }
}

impl Tuning {
    /// Smallest spawn interval accepted, regardless of configuration
    pub const HARD_MIN_SPAWN_INTERVAL: f32 = 0.1;

    /// Clamp nonsensical values so the simulation invariants still hold
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let non_negative = |v: f32, fallback: f32| if v.is_finite() && v >= 0.0 { v } else { fallback };

        self.player_speed = non_negative(self.player_speed, defaults.player_speed);
        self.player_radius = non_negative(self.player_radius, defaults.player_radius);
        self.obstacle_base_speed = non_negative(self.obstacle_base_speed, defaults.obstacle_base_speed);
        self.obstacle_speed_ramp = non_negative(self.obstacle_speed_ramp, defaults.obstacle_speed_ramp);
        self.obstacle_max_speed = non_negative(self.obstacle_max_speed, defaults.obstacle_max_speed)
            .max(self.obstacle_base_speed);
        self.spawn_interval_decay =
            non_negative(self.spawn_interval_decay, defaults.spawn_interval_decay);
        self.score_per_second = non_negative(self.score_per_second, defaults.score_per_second);

        if !(self.obstacle_size.is_finite() && self.obstacle_size > 0.0) {
            self.obstacle_size = defaults.obstacle_size;
        }

        self.spawn_interval_min = if self.spawn_interval_min.is_finite() {
            self.spawn_interval_min.max(Self::HARD_MIN_SPAWN_INTERVAL)
        } else {
            defaults.spawn_interval_min
        };
        self.spawn_interval_initial = if self.spawn_interval_initial.is_finite() {
            self.spawn_interval_initial.max(self.spawn_interval_min)
        } else {
            defaults.spawn_interval_initial.max(self.spawn_interval_min)
        };

        self
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Balance values
    pub tuning: Tuning,
    /// Draw collision envelopes over sprites
    pub show_hitboxes: bool,
    /// Reduced motion (no decorative spin on the ball obstacle)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            show_hitboxes: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "pet_dodge_settings";

    /// Parse settings supplied by the embedding page; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.tuning = settings.tuning.validated();
        Ok(settings)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_takes_defaults() {
        let settings = Settings::from_json(r#"{"show_hitboxes": true, "tuning": {"player_speed": 500}}"#)
            .unwrap();
        assert!(settings.show_hitboxes);
        assert_eq!(settings.tuning.player_speed, 500.0);
        assert_eq!(settings.tuning.spawn_interval_min, Tuning::default().spawn_interval_min);
    }

    #[test]
    fn test_validated_keeps_spawn_floor_sane() {
        let tuning = Tuning {
            spawn_interval_initial: 0.2,
            spawn_interval_min: -1.0,
            ..Default::default()
        }
        .validated();
        assert_eq!(tuning.spawn_interval_min, Tuning::HARD_MIN_SPAWN_INTERVAL);
        assert!(tuning.spawn_interval_initial >= tuning.spawn_interval_min);

        let tuning = Tuning {
            spawn_interval_initial: 0.3,
            spawn_interval_min: 0.5,
            ..Default::default()
        }
        .validated();
        assert_eq!(tuning.spawn_interval_initial, 0.5);
    }

    #[test]
    fn test_validated_rejects_non_finite() {
        let tuning = Tuning {
            player_speed: f32::NAN,
            obstacle_size: 0.0,
            obstacle_max_speed: 10.0,
            ..Default::default()
        }
        .validated();
        assert_eq!(tuning.player_speed, Tuning::default().player_speed);
        assert_eq!(tuning.obstacle_size, Tuning::default().obstacle_size);
        assert_eq!(tuning.obstacle_max_speed, tuning.obstacle_base_speed);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Settings::from_json("{not json").is_err());
    }
}
