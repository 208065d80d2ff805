//! Gesture and pointer input configuration types.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Timings for the hand-gesture input path.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureConfig {
    /// How long an open hand must be held before picking is armed.
    /// Default: 300
    pub arm_hold_ms: u64,

    /// How long the gate stays armed after the hand disappears.
    /// Absorbs the gap between opening and closing the hand.
    /// Default: 800
    pub grace_ms: u64,

    /// How long a closed fist must be held to commit a pick.
    /// Default: 1000
    pub commit_threshold_ms: u64,

    /// Gap between classifier samples after which the hand counts as absent.
    /// Default: 500
    pub absence_timeout_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            arm_hold_ms: 300,
            grace_ms: 800,
            commit_threshold_ms: 1000,
            absence_timeout_ms: 500,
        }
    }
}

impl GestureConfig {
    /// Arm hold as a [`Duration`].
    #[must_use]
    pub const fn arm_hold(&self) -> Duration { Duration::from_millis(self.arm_hold_ms) }

    /// Grace period as a [`Duration`].
    #[must_use]
    pub const fn grace(&self) -> Duration { Duration::from_millis(self.grace_ms) }

    /// Commit threshold as a [`Duration`].
    #[must_use]
    pub const fn commit_threshold(&self) -> Duration {
        Duration::from_millis(self.commit_threshold_ms)
    }

    /// Absence timeout as a [`Duration`].
    #[must_use]
    pub const fn absence_timeout(&self) -> Duration {
        Duration::from_millis(self.absence_timeout_ms)
    }
}

/// Pointer click and drag behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PointerConfig {
    /// Horizontal travel (in pixels) above which a press becomes a drag.
    /// Default: 10
    pub click_tolerance_px: f64,

    /// Ring rotation per dragged pixel, in radians.
    /// Default: 0.002
    pub drag_sensitivity: f64,

    /// Multiplier applied to the last drag velocity on release.
    /// Default: 3
    pub inertia_gain: f64,

    /// Per-frame decay of the inertia velocity.
    /// Default: 0.95
    pub inertia_decay: f64,

    /// Inertia velocity below which the ring resumes auto-rotation.
    /// Default: 0.001
    pub inertia_min: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            click_tolerance_px: 10.0,
            drag_sensitivity: 0.002,
            inertia_gain: 3.0,
            inertia_decay: 0.95,
            inertia_min: 0.001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_defaults() {
        let config = GestureConfig::default();
        assert_eq!(config.arm_hold(), Duration::from_millis(300));
        assert_eq!(config.grace(), Duration::from_millis(800));
        assert_eq!(config.commit_threshold(), Duration::from_secs(1));
    }

    #[test]
    fn test_gesture_partial_override() {
        let config: GestureConfig = serde_json::from_str(r#"{ "commitThresholdMs": 1500 }"#).unwrap();
        assert_eq!(config.commit_threshold_ms, 1500);
        assert_eq!(config.arm_hold_ms, 300);
    }

    #[test]
    fn test_pointer_defaults() {
        let config = PointerConfig::default();
        assert!((config.click_tolerance_px - 10.0).abs() < f64::EPSILON);
        assert!((config.inertia_decay - 0.95).abs() < f64::EPSILON);
    }
}
