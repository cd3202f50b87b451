//! Data-driven game balance
//!
//! Defaults come from [`crate::consts`]. A JSON file only needs the keys it
//! wants to override.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::state::SizeClass;

/// Per-size lookup table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerSize<T> {
    pub small: T,
    pub medium: T,
    pub large: T,
}

impl<T: Copy> PerSize<T> {
    pub fn get(&self, size: SizeClass) -> T {
        match size {
            SizeClass::Small => self.small,
            SizeClass::Medium => self.medium,
            SizeClass::Large => self.large,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field_width: f32,
    pub field_height: f32,
    pub max_lives: u32,

    pub drone_radius: f32,
    pub drone_speed: f32,
    pub drone_spawn_spread: f32,

    pub ship_width: f32,
    pub ship_height: f32,
    pub ship_margin: f32,

    /// Base points before material, session and combo multipliers
    pub base_points: PerSize<u32>,
    pub asteroid_hp: PerSize<i32>,
    pub shake: PerSize<f32>,

    pub combo_step: u32,
    pub combo_fade_ms: Millis,
    pub combo_decay_ms: Millis,
    pub slow_motion_ms: Millis,
    pub slow_motion_scale: f32,

    pub capsule_radius: f32,
    pub capsule_fall_speed: f32,

    pub par_time_secs: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            max_lives: MAX_LIVES,

            drone_radius: DRONE_RADIUS,
            drone_speed: DRONE_SPEED,
            drone_spawn_spread: DRONE_SPAWN_SPREAD,

            ship_width: SHIP_WIDTH,
            ship_height: SHIP_HEIGHT,
            ship_margin: SHIP_MARGIN,

            base_points: PerSize {
                small: POINTS_SMALL,
                medium: POINTS_MEDIUM,
                large: POINTS_LARGE,
            },
            asteroid_hp: PerSize {
                small: HP_SMALL,
                medium: HP_MEDIUM,
                large: HP_LARGE,
            },
            shake: PerSize {
                small: SHAKE_SMALL,
                medium: SHAKE_MEDIUM,
                large: SHAKE_LARGE,
            },

            combo_step: COMBO_STEP,
            combo_fade_ms: COMBO_FADE_MS,
            combo_decay_ms: COMBO_DECAY_MS,
            slow_motion_ms: SLOW_MOTION_MS,
            slow_motion_scale: SLOW_MOTION_SCALE,

            capsule_radius: CAPSULE_RADIUS,
            capsule_fall_speed: CAPSULE_FALL_SPEED,

            par_time_secs: PAR_TIME_SECS,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if self.max_lives == 0 {
            return invalid("max_lives", "must be at least 1");
        }
        if self.combo_step == 0 {
            return invalid("combo_step", "must be at least 1");
        }
        if !(self.drone_speed > 0.0) {
            return invalid("drone_speed", "must be positive");
        }
        if !(self.drone_radius > 0.0) {
            return invalid("drone_radius", "must be positive");
        }
        if !(self.ship_width > 0.0 && self.ship_height > 0.0) {
            return invalid("ship_width", "ship dimensions must be positive");
        }
        if !(self.field_width > self.ship_width && self.field_height > 0.0) {
            return invalid("field_width", "field must be wider than the ship");
        }
        if !(self.slow_motion_scale > 0.0 && self.slow_motion_scale <= 1.0) {
            return invalid("slow_motion_scale", "must be in (0, 1]");
        }
        let hp = self.asteroid_hp;
        if hp.small < 1 || hp.medium < 1 || hp.large < 1 {
            return invalid("asteroid_hp", "every size needs at least 1 hp");
        }
        Ok(())
    }

    /// Score multiplier contributed by the current combo
    pub fn combo_multiplier(&self, combo: u32) -> u32 {
        1 + combo / self.combo_step
    }
}
