//! Process-wide gesture configuration.
//!
//! A [`GestureConfig`] is built once (defaults, or a TOML file) before a
//! session starts and is read-only for the session's lifetime.
//!
//! ```toml
//! circle_policy = "grab"        # or "continuous"
//! hide_delay_ms = 500
//!
//! [enabled]
//! key_tap = false
//!
//! [deadzones]
//! hand_rotation = { min = -5.0, max = 5.0 }
//!
//! [thresholds]
//! swipe_min_speed = 1000.0
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::event::GestureKind;

// ════════════════════════════════════════════════════════════════════════════
// Deadzone
// ════════════════════════════════════════════════════════════════════════════

/// Input range inside which a continuous sample component counts as noise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deadzone {
    pub min: f32,
    pub max: f32,
}

impl Deadzone {
    pub const fn new(min: f32, max: f32) -> Self { Deadzone { min, max } }

    /// True when `v` lies inside the dead range (bounds inclusive).
    pub fn contains(&self, v: f32) -> bool { v >= self.min && v <= self.max }

    /// Zero a value inside the dead range, pass anything else through.
    pub fn apply(&self, v: f32) -> f32 {
        if self.contains(v) { 0.0 } else { v }
    }
}

impl Default for Deadzone {
    fn default() -> Self { Deadzone::new(-1.0, 1.0) }
}

/// Deadzones for the three continuous signals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deadzones {
    pub hand_position:   Deadzone,
    pub hand_rotation:   Deadzone,
    pub finger_position: Deadzone,
}

// ════════════════════════════════════════════════════════════════════════════
// Enable flags
// ════════════════════════════════════════════════════════════════════════════

/// Per-gesture enable gates. A disabled gesture's handler is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledGestures {
    pub circle:          bool,
    pub swipe:           bool,
    pub screen_tap:      bool,
    pub key_tap:         bool,
    pub hand_position:   bool,
    pub hand_rotation:   bool,
    pub finger_position: bool,
}

impl Default for EnabledGestures {
    fn default() -> Self {
        EnabledGestures {
            circle:          true,
            swipe:           true,
            screen_tap:      true,
            key_tap:         true,
            hand_position:   true,
            hand_rotation:   true,
            finger_position: true,
        }
    }
}

impl EnabledGestures {
    pub fn all_disabled() -> Self {
        EnabledGestures {
            circle:          false,
            swipe:           false,
            screen_tap:      false,
            key_tap:         false,
            hand_position:   false,
            hand_rotation:   false,
            finger_position: false,
        }
    }

    pub fn is_enabled(&self, kind: GestureKind) -> bool {
        match kind {
            GestureKind::Circle         => self.circle,
            GestureKind::Swipe          => self.swipe,
            GestureKind::ScreenTap      => self.screen_tap,
            GestureKind::KeyTap         => self.key_tap,
            GestureKind::HandPosition   => self.hand_position,
            GestureKind::HandRotation   => self.hand_rotation,
            GestureKind::FingerPosition => self.finger_position,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Circle policy
// ════════════════════════════════════════════════════════════════════════════

/// How a circle gesture drives the indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CirclePolicy {
    /// Show the indicator while the circle is in progress; hide it as soon
    /// as the circle stops.
    #[default]
    #[serde(alias = "continuous")]
    ContinuousIndicator,

    /// Grab everything inside the circle on each completed pass and hide the
    /// indicator only after a quiet period, so back-to-back passes don't
    /// flicker.
    #[serde(alias = "grab")]
    GrabAndDebounce,
}

// ════════════════════════════════════════════════════════════════════════════
// Sensor thresholds
// ════════════════════════════════════════════════════════════════════════════

/// Sensitivity thresholds used when classifying raw hand samples.
///
/// Units follow the device: millimetres, mm/s, seconds, turns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorThresholds {
    /// Turns the fingertip must sweep before a circle is reported.
    pub circle_min_progress:             f32,
    /// Smallest circle radius (mm) that counts.
    pub circle_min_radius:               f32,
    /// Palm speed (mm/s) a swipe must reach.
    pub swipe_min_speed:                 f32,
    /// Distance (mm) the palm must travel at swipe speed.
    pub swipe_min_length:                f32,
    /// Forward fingertip speed (mm/s) for a screen tap.
    pub screen_tap_min_forward_velocity: f32,
    /// Downward fingertip speed (mm/s) for a key tap.
    pub key_tap_min_down_velocity:       f32,
    /// Window (s) in which a tap must reverse direction.
    pub tap_history:                     f32,
}

impl Default for SensorThresholds {
    fn default() -> Self {
        SensorThresholds {
            circle_min_progress:             0.75,
            circle_min_radius:               5.0,
            swipe_min_speed:                 1000.0,
            swipe_min_length:                150.0,
            screen_tap_min_forward_velocity: 50.0,
            key_tap_min_down_velocity:       50.0,
            tap_history:                     0.1,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig
// ════════════════════════════════════════════════════════════════════════════

/// Everything the controller and the binding layer need to know.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub enabled:             EnabledGestures,
    pub deadzones:           Deadzones,
    pub circle_policy:       CirclePolicy,
    /// Device radius is divided by this to get the indicator size.
    pub circle_radius_scale: f32,
    /// Quiet period before a grab-mode indicator hides.
    pub hide_delay_ms:       u64,
    /// Indicator spin magnitude in degrees per second.
    pub indicator_spin_rate: f32,
    pub thresholds:          SensorThresholds,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            enabled:             EnabledGestures::default(),
            deadzones:           Deadzones::default(),
            circle_policy:       CirclePolicy::default(),
            circle_radius_scale: 2.0,
            hide_delay_ms:       500,
            indicator_spin_rate: 180.0,
            thresholds:          SensorThresholds::default(),
        }
    }
}

impl GestureConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let cfg: GestureConfig = toml::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml_str(&src)?;
        tracing::info!(path = %path.display(), policy = ?cfg.circle_policy, "loaded gesture config");
        Ok(cfg)
    }

    pub fn with_policy(mut self, policy: CirclePolicy) -> Self {
        self.circle_policy = policy;
        self
    }

    pub fn hide_delay(&self) -> Duration { Duration::from_millis(self.hide_delay_ms) }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zones = [
            ("hand_position",   self.deadzones.hand_position),
            ("hand_rotation",   self.deadzones.hand_rotation),
            ("finger_position", self.deadzones.finger_position),
        ];
        for (name, dz) in zones {
            if !(dz.min <= dz.max) {
                return Err(ConfigError::InvalidDeadzone { name, min: dz.min, max: dz.max });
            }
        }
        if !(self.circle_radius_scale > 0.0) {
            return Err(ConfigError::InvalidValue {
                name:   "circle_radius_scale",
                reason: format!("must be positive, got {}", self.circle_radius_scale),
            });
        }
        if !(self.indicator_spin_rate > 0.0) {
            return Err(ConfigError::InvalidValue {
                name:   "indicator_spin_rate",
                reason: format!("must be positive, got {}", self.indicator_spin_rate),
            });
        }
        if !(self.thresholds.tap_history > 0.0) {
            return Err(ConfigError::InvalidValue {
                name:   "thresholds.tap_history",
                reason: format!("must be positive, got {}", self.thresholds.tap_history),
            });
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
