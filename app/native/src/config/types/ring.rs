//! Rotating ring configuration types.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::modules::selection::state::Vec3;

/// Geometry and rotation speeds of the card ring.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RingConfig {
    /// Time for one full revolution at normal speed.
    /// Default: 60000
    pub normal_period_ms: u64,

    /// Time for one full revolution while picking is armed.
    /// Default: 10000
    pub fast_period_ms: u64,

    /// Time for one full revolution while a pick is in flight.
    /// Default: 90000
    pub slow_period_ms: u64,

    /// Width of a card on the ring.
    /// Default: 0.84
    pub card_width: f64,

    /// Gap between neighbouring cards.
    /// Default: 0.08
    pub card_spacing: f64,

    /// Uniform scale applied to the whole ring.
    /// Default: 0.3
    pub group_scale: f64,

    /// World-space center of the ring.
    pub center: Vec3,

    /// Reference point for nearest-card queries (the camera position).
    pub reference: Vec3,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            normal_period_ms: 60_000,
            fast_period_ms: 10_000,
            slow_period_ms: 90_000,
            card_width: 0.84,
            card_spacing: 0.08,
            group_scale: 0.3,
            center: Vec3::ZERO,
            reference: Vec3::new(0.0, -0.6, 7.7),
        }
    }
}

impl RingConfig {
    /// Normal revolution period.
    #[must_use]
    pub const fn normal_period(&self) -> Duration { Duration::from_millis(self.normal_period_ms) }

    /// Armed revolution period.
    #[must_use]
    pub const fn fast_period(&self) -> Duration { Duration::from_millis(self.fast_period_ms) }

    /// Committing revolution period.
    #[must_use]
    pub const fn slow_period(&self) -> Duration { Duration::from_millis(self.slow_period_ms) }
}
